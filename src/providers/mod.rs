// Third-party API clients
mod binance;
mod coinmarketcap;

pub use binance::*;
pub use coinmarketcap::*;

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Result<Client> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(client)
}
