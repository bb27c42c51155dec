// Binance public REST API: spot ticker and daily klines
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::build_client;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_INTERVAL: &str = "1d";

/// Index of the close price inside a kline array
const CLOSE_INDEX: usize = 4;

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Too few candles came back to compute a moving average
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsufficientData {
    #[error("Not enough data for MA{period}. Got {got} candles.")]
    Period { period: usize, got: usize },

    #[error("Not enough data. Got {got} candles, need {need}.")]
    Window { got: usize, need: usize },
}

/// Client for the Binance public API. No API key required.
pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn name(&self) -> &str {
        "binance"
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current BTC price in USDT
    pub async fn get_btc_price(&self) -> Result<f64> {
        let url = format!("{}/ticker/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", DEFAULT_SYMBOL)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Binance API error: {}", response.status()));
        }

        let body: Value = response.json().await?;
        parse_ticker_price(body)
    }

    /// Raw daily candles, oldest first
    pub async fn get_klines(&self, limit: usize) -> Result<Vec<Value>> {
        let url = format!("{}/klines", self.base_url);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", DEFAULT_SYMBOL),
                ("interval", DEFAULT_INTERVAL),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Binance API error: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    async fn get_closing_prices(&self, limit: usize) -> Result<Vec<f64>> {
        let klines = self.get_klines(limit).await?;
        parse_closing_prices(&klines)
    }

    /// Simple moving average of the last `period` daily closes
    pub async fn get_ma(&self, period: usize) -> Result<f64> {
        let closes = self.get_closing_prices(period).await?;
        moving_average(&closes, period)
    }

    /// MA50 and MA200 from a single 200-candle request
    pub async fn get_ma_both(&self) -> Result<(f64, f64)> {
        let closes = self.get_closing_prices(200).await?;
        ma50_and_ma200(&closes)
    }
}

fn finite_price(price: f64) -> Result<f64> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(anyhow::anyhow!("Invalid price data: {}", price))
    }
}

pub fn parse_ticker_price(body: Value) -> Result<f64> {
    let ticker: TickerPrice = serde_json::from_value(body)
        .map_err(|e| anyhow::anyhow!("Invalid price data: {}", e))?;
    finite_price(ticker.price.parse::<f64>()?)
}

/// Close prices from kline arrays. Binance sends them as decimal strings.
pub fn parse_closing_prices(klines: &[Value]) -> Result<Vec<f64>> {
    klines
        .iter()
        .map(|kline| -> Result<f64> {
            let close = kline
                .get(CLOSE_INDEX)
                .ok_or_else(|| anyhow::anyhow!("Malformed kline: {}", kline))?;
            let price = match close {
                Value::String(s) => s.parse::<f64>()?,
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| anyhow::anyhow!("Invalid close price: {}", n))?,
                other => return Err(anyhow::anyhow!("Invalid close price: {}", other)),
            };
            finite_price(price)
        })
        .collect()
}

/// Mean of the trailing `period` values.
pub fn moving_average(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(anyhow::anyhow!("Moving average period must be positive"));
    }
    if closes.len() < period {
        return Err(InsufficientData::Period {
            period,
            got: closes.len(),
        }
        .into());
    }

    let window = &closes[closes.len() - period..];
    Ok(window.iter().sum::<f64>() / period as f64)
}

/// MA50 over the last 50 closes and MA200 over the last 200.
pub fn ma50_and_ma200(closes: &[f64]) -> Result<(f64, f64)> {
    if closes.len() < 200 {
        return Err(InsufficientData::Window {
            got: closes.len(),
            need: 200,
        }
        .into());
    }

    Ok((moving_average(closes, 50)?, moving_average(closes, 200)?))
}
