use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::models::{DataResult, DataType};
use crate::providers::{BinanceProvider, CoinMarketCapProvider};
use crate::sources::{BtcPriceSource, DataSource, MaSource, MarketCapKind, MarketCapSource};

struct CachedResult {
    result: DataResult,
    fetched_at: Instant,
}

/// Dispatches metric requests to their sources
#[derive(Clone)]
pub struct DataFetcher {
    sources: Arc<HashMap<DataType, Box<dyn DataSource>>>,
    // Recent results by metric, reused while younger than `cache_ttl`
    cache: Arc<Mutex<HashMap<DataType, CachedResult>>>,
    cache_ttl: Duration,
}

impl DataFetcher {
    pub fn new(sources: Vec<Box<dyn DataSource>>, cache_ttl: Duration) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.data_type(), source))
            .collect();

        Self {
            sources: Arc::new(sources),
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl,
        }
    }

    /// Wire up the Binance and CoinMarketCap backed sources
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let binance = Arc::new(BinanceProvider::new(&config.binance_base_url)?);
        let coinmarketcap = Arc::new(CoinMarketCapProvider::new(
            &config.coinmarketcap_base_url,
            config.coinmarketcap_api_key.clone(),
        )?);

        let sources: Vec<Box<dyn DataSource>> = vec![
            Box::new(BtcPriceSource::new(binance.clone())),
            Box::new(MarketCapSource::new(MarketCapKind::Total, coinmarketcap.clone())),
            Box::new(MarketCapSource::new(MarketCapKind::Stablecoin, coinmarketcap)),
            Box::new(MaSource::new(50, binance.clone())?),
            Box::new(MaSource::new(200, binance)?),
        ];

        Ok(Self::new(sources, config.cache_ttl))
    }

    pub async fn get(&self, data_type: DataType) -> Result<DataResult> {
        if let Some(result) = self.cached(data_type) {
            debug!("Cache hit for {}", data_type);
            return Ok(result);
        }

        let source = self
            .sources
            .get(&data_type)
            .ok_or_else(|| anyhow::anyhow!("No source configured for {}", data_type))?;

        match source.fetch().await {
            Ok(result) => {
                info!("Fetched {} from {}: {}", data_type, result.provider, result.value);
                self.store(data_type, &result);
                Ok(result)
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", data_type, e);
                Err(e)
            }
        }
    }

    /// Fetch every known metric. Any single failure fails the whole batch.
    pub async fn get_all(&self) -> Result<BTreeMap<String, DataResult>> {
        let mut results = BTreeMap::new();
        for data_type in DataType::ALL {
            let result = self.get(data_type).await?;
            results.insert(data_type.as_str().to_string(), result);
        }
        Ok(results)
    }

    fn cached(&self, data_type: DataType) -> Option<DataResult> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        let cache = self.lock_cache();
        let hit = cache
            .get(&data_type)
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.result.clone());
        hit
    }

    fn store(&self, data_type: DataType, result: &DataResult) {
        if self.cache_ttl.is_zero() {
            return;
        }
        self.lock_cache().insert(
            data_type,
            CachedResult {
                result: result.clone(),
                fetched_at: Instant::now(),
            },
        );
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<DataType, CachedResult>> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Result cache lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}
