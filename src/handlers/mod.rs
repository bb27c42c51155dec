mod data_handlers;

pub use data_handlers::*;
