//! Market data source configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{check_url, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Use the live snapshot API; otherwise a fixed stub answers
    #[serde(default = "default_live")]
    pub live: bool,

    /// Sent as `X-API-KEY` when present
    pub api_key: Option<String>,
}

impl MarketDataSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url(&self.base_url, "market data")?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("market data"));
        }
        Ok(())
    }
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            live: default_live(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.financialdatasets.ai".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_live() -> bool {
    true
}
