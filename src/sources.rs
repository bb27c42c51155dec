// Data sources: one per metric, each backed by a provider
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::models::{DataResult, DataType};
use crate::providers::{BinanceProvider, CoinMarketCapProvider, DEFAULT_INTERVAL, DEFAULT_SYMBOL};

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> Result<DataResult>;
    fn data_type(&self) -> DataType;
}

fn build_result(
    data_type: DataType,
    value: f64,
    provider: &str,
    metadata: HashMap<String, Value>,
) -> DataResult {
    DataResult {
        data_type: data_type.as_str().to_string(),
        value,
        provider: provider.to_string(),
        metadata: Some(metadata),
        timestamp: Some(Utc::now().to_rfc3339()),
    }
}

/// Spot BTC price from the Binance ticker
pub struct BtcPriceSource {
    provider: Arc<BinanceProvider>,
}

impl BtcPriceSource {
    pub fn new(provider: Arc<BinanceProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl DataSource for BtcPriceSource {
    async fn fetch(&self) -> Result<DataResult> {
        let price = self.provider.get_btc_price().await?;
        let metadata = HashMap::from([("symbol".to_string(), json!(DEFAULT_SYMBOL))]);
        Ok(build_result(DataType::BtcPrice, price, self.provider.name(), metadata))
    }

    fn data_type(&self) -> DataType {
        DataType::BtcPrice
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketCapKind {
    Total,
    Stablecoin,
}

/// Market-wide capitalisation from CoinMarketCap global metrics
pub struct MarketCapSource {
    kind: MarketCapKind,
    provider: Arc<CoinMarketCapProvider>,
}

impl MarketCapSource {
    pub fn new(kind: MarketCapKind, provider: Arc<CoinMarketCapProvider>) -> Self {
        Self { kind, provider }
    }
}

#[async_trait]
impl DataSource for MarketCapSource {
    async fn fetch(&self) -> Result<DataResult> {
        let metrics = self.provider.get_global_metrics().await?;
        let value = match self.kind {
            MarketCapKind::Total => metrics.total_market_cap,
            MarketCapKind::Stablecoin => metrics.stablecoin_market_cap,
        };
        let metadata = HashMap::from([("currency".to_string(), json!("USD"))]);
        Ok(build_result(self.data_type(), value, self.provider.name(), metadata))
    }

    fn data_type(&self) -> DataType {
        match self.kind {
            MarketCapKind::Total => DataType::TotalMarketCap,
            MarketCapKind::Stablecoin => DataType::StablecoinMarketCap,
        }
    }
}

/// Moving average of daily BTC closes on Binance
pub struct MaSource {
    period: usize,
    provider: Arc<BinanceProvider>,
}

impl MaSource {
    pub const SUPPORTED_PERIODS: [usize; 2] = [50, 200];

    pub fn new(period: usize, provider: Arc<BinanceProvider>) -> Result<Self> {
        if !Self::SUPPORTED_PERIODS.contains(&period) {
            return Err(anyhow::anyhow!(
                "Unsupported MA period: {}. Use 50 or 200.",
                period
            ));
        }
        Ok(Self { period, provider })
    }
}

#[async_trait]
impl DataSource for MaSource {
    async fn fetch(&self) -> Result<DataResult> {
        let value = self.provider.get_ma(self.period).await?;
        let metadata = HashMap::from([
            ("period".to_string(), json!(self.period)),
            ("symbol".to_string(), json!(DEFAULT_SYMBOL)),
            ("interval".to_string(), json!(DEFAULT_INTERVAL)),
        ]);
        Ok(build_result(self.data_type(), value, self.provider.name(), metadata))
    }

    fn data_type(&self) -> DataType {
        if self.period == 50 {
            DataType::Ma50
        } else {
            DataType::Ma200
        }
    }
}
