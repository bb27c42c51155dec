// CoinMarketCap Pro API: global market metrics
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::build_client;

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Market-wide totals in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalMetrics {
    pub total_market_cap: f64,
    pub stablecoin_market_cap: f64,
}

#[derive(Debug, Deserialize)]
struct GlobalMetricsEnvelope {
    data: GlobalMetricsData,
}

#[derive(Debug, Deserialize)]
struct GlobalMetricsData {
    quote: GlobalMetricsQuote,
}

#[derive(Debug, Deserialize)]
struct GlobalMetricsQuote {
    #[serde(rename = "USD")]
    usd: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    total_market_cap: f64,
    stablecoin_market_cap: f64,
}

pub struct CoinMarketCapProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinMarketCapProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn name(&self) -> &str {
        "coinmarketcap"
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_global_metrics(&self) -> Result<GlobalMetrics> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("COINMARKETCAP_API_KEY is not set"))?;

        let url = format!("{}/global-metrics/quotes/latest", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("CoinMarketCap API error: {}", response.status()));
        }

        let body: Value = response.json().await?;
        parse_global_metrics(body)
    }
}

pub fn parse_global_metrics(body: Value) -> Result<GlobalMetrics> {
    let envelope: GlobalMetricsEnvelope = serde_json::from_value(body)
        .map_err(|e| anyhow::anyhow!("Invalid global metrics data: {}", e))?;
    let usd = envelope.data.quote.usd;

    Ok(GlobalMetrics {
        total_market_cap: usd.total_market_cap,
        stablecoin_market_cap: usd.stablecoin_market_cap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_global_metrics() {
        let body = json!({
            "status": {"error_code": 0, "error_message": null},
            "data": {
                "active_cryptocurrencies": 9000,
                "quote": {
                    "USD": {
                        "total_market_cap": 2.45e12,
                        "total_volume_24h": 9.1e10,
                        "stablecoin_market_cap": 1.6e11,
                        "last_updated": "2025-01-01T00:00:00.000Z"
                    }
                }
            }
        });

        let metrics = parse_global_metrics(body).unwrap();
        assert_eq!(metrics.total_market_cap, 2.45e12);
        assert_eq!(metrics.stablecoin_market_cap, 1.6e11);
    }

    #[test]
    fn test_parse_global_metrics_missing_quote() {
        let body = json!({"status": {"error_code": 1002, "error_message": "API key missing."}});
        assert!(parse_global_metrics(body).is_err());
    }

    #[actix_web::test]
    async fn test_missing_api_key_fails_before_request() {
        let provider = CoinMarketCapProvider::new("http://127.0.0.1:9", None).unwrap();
        let err = provider.get_global_metrics().await.unwrap_err();
        assert_eq!(err.to_string(), "COINMARKETCAP_API_KEY is not set");
    }
}
