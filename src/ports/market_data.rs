//! Market Data Port - Interface for price snapshot sources.
//!
//! Fetch failures are soft: callers that feed a tool use
//! [`MarketDataSource::snapshot_or_empty`], which logs the failure and yields
//! an empty JSON object instead of an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Port for fetching the latest price snapshot of a ticker.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the current snapshot.
    async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, DataFetchError>;

    /// Fetches the snapshot as JSON, or `{}` on any failure.
    async fn snapshot_or_empty(&self, ticker: &str) -> Value {
        match self.fetch_snapshot(ticker).await {
            Ok(snapshot) => snapshot.to_json(),
            Err(err) => {
                tracing::warn!(ticker, error = %err, "Market data fetch failed, returning empty result");
                Value::Object(Map::new())
            }
        }
    }
}

/// Latest trading data for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub price: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_change_percent: Option<f64>,
}

impl MarketSnapshot {
    /// Snapshot with price and volume only.
    pub fn new(ticker: impl Into<String>, price: f64, volume: u64) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            volume,
            day_change: None,
            day_change_percent: None,
        }
    }

    /// Adds the day's absolute and relative change.
    pub fn with_day_change(mut self, change: f64, percent: f64) -> Self {
        self.day_change = Some(change);
        self.day_change_percent = Some(percent);
        self
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Soft failures of a snapshot fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataFetchError {
    #[error("data provider responded with status {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("response contained no snapshot")]
    MissingSnapshot,

    #[error("failed to parse response: {0}")]
    Parse(String),
}
