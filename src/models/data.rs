use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One metric value as produced by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResult {
    pub data_type: String,
    pub value: f64,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Envelope returned for a batch of metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub data: BTreeMap<String, DataResult>,
}

/// Response for a single metric: the result fields flattened next to `ok`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub result: DataResult,
}

/// Response for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}

/// Display labels keyed by metric identifier.
pub static DATA_LABELS: &[(&str, &str)] = &[
    ("btc_price", "BTC Price"),
    ("total_market_cap", "Total Market Cap"),
    ("stablecoin_market_cap", "Stablecoin Market Cap"),
    ("ma50", "50-Day Moving Average"),
    ("ma200", "200-Day Moving Average"),
];

/// Look up the display label for a metric identifier.
///
/// Returns `None` for identifiers outside the table; what to show instead
/// is up to the caller.
pub fn data_label(data_type: &str) -> Option<&'static str> {
    DATA_LABELS
        .iter()
        .find(|(key, _)| *key == data_type)
        .map(|(_, label)| *label)
}

/// Metrics the backend knows how to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    BtcPrice,
    TotalMarketCap,
    StablecoinMarketCap,
    Ma50,
    Ma200,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::BtcPrice,
        DataType::TotalMarketCap,
        DataType::StablecoinMarketCap,
        DataType::Ma50,
        DataType::Ma200,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::BtcPrice => "btc_price",
            DataType::TotalMarketCap => "total_market_cap",
            DataType::StablecoinMarketCap => "stablecoin_market_cap",
            DataType::Ma50 => "ma50",
            DataType::Ma200 => "ma200",
        }
    }

    /// Every variant has an entry in `DATA_LABELS`, so this falls back to the
    /// identifier only if the table and the enum drift apart.
    pub fn label(&self) -> &'static str {
        data_label(self.as_str()).unwrap_or_else(|| self.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid data_type: {given}. Valid types: {valid:?}")]
pub struct InvalidDataType {
    pub given: String,
    pub valid: Vec<&'static str>,
}

impl FromStr for DataType {
    type Err = InvalidDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dtype| dtype.as_str() == s)
            .ok_or_else(|| InvalidDataType {
                given: s.to_string(),
                valid: DataType::ALL.iter().map(|d| d.as_str()).collect(),
            })
    }
}
