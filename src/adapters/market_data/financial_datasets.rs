//! Financial Datasets client - MarketDataSource over the price snapshot endpoint.
//!
//! `GET {base_url}/prices/snapshot/?ticker={ticker}`; the response carries the
//! data under a `snapshot` key.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{DataFetchError, MarketDataSource, MarketSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.financialdatasets.ai";
const USER_AGENT: &str = "Mozilla/0.1";

/// Configuration for the snapshot client.
#[derive(Debug, Clone)]
pub struct FinancialDatasetsConfig {
    pub base_url: String,
    pub timeout: Duration,
    api_key: Option<Secret<String>>,
}

impl Default for FinancialDatasetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            api_key: None,
        }
    }
}

impl FinancialDatasetsConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends the key as `X-API-KEY`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }
}

/// HTTP client for live price snapshots.
pub struct FinancialDatasetsClient {
    config: FinancialDatasetsConfig,
    client: Client,
}

impl FinancialDatasetsClient {
    pub fn new(config: FinancialDatasetsConfig) -> Result<Self, DataFetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataFetchError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn snapshot_url(&self) -> String {
        format!("{}/prices/snapshot/", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MarketDataSource for FinancialDatasetsClient {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, DataFetchError> {
        let mut request = self
            .client
            .get(self.snapshot_url())
            .query(&[("ticker", ticker)])
            .header("Accept", "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header("X-API-KEY", key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| DataFetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataFetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SnapshotResponse = response
            .json()
            .await
            .map_err(|e| DataFetchError::Parse(e.to_string()))?;
        let snapshot = body.snapshot.ok_or(DataFetchError::MissingSnapshot)?;

        tracing::info!(ticker, price = snapshot.price, "Fetched market data");

        let mut result = MarketSnapshot::new(ticker, snapshot.price, snapshot.volume);
        if let (Some(change), Some(percent)) = (snapshot.day_change, snapshot.day_change_percent) {
            result = result.with_day_change(change, percent);
        }
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    snapshot: Option<SnapshotBody>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBody {
    price: f64,
    #[serde(default)]
    volume: u64,
    #[serde(default)]
    day_change: Option<f64>,
    #[serde(default)]
    day_change_percent: Option<f64>,
}
