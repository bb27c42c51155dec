// Export service modules
mod fetcher;

pub use fetcher::*;
