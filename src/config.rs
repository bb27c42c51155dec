use std::env;
use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.us/api/v3";
pub const DEFAULT_COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Runtime settings read from the environment (and `.env`, if present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub binance_base_url: String,
    pub coinmarketcap_base_url: String,
    pub coinmarketcap_api_key: Option<String>,
    pub cache_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            binance_base_url: DEFAULT_BINANCE_BASE_URL.to_string(),
            coinmarketcap_base_url: DEFAULT_COINMARKETCAP_BASE_URL.to_string(),
            coinmarketcap_api_key: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cache_ttl = match non_empty("CACHE_TTL_SECS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) => Duration::from_secs(secs),
            Some(Err(e)) => {
                log::warn!("Ignoring invalid CACHE_TTL_SECS: {}", e);
                defaults.cache_ttl
            }
            None => defaults.cache_ttl,
        };

        Self {
            bind_address: non_empty("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            binance_base_url: non_empty("BINANCE_BASE_URL").unwrap_or(defaults.binance_base_url),
            coinmarketcap_base_url: non_empty("COINMARKETCAP_BASE_URL")
                .unwrap_or(defaults.coinmarketcap_base_url),
            coinmarketcap_api_key: non_empty("COINMARKETCAP_API_KEY"),
            cache_ttl,
        }
    }
}
