mod data;
mod error;

pub use data::*;
pub use error::*;
