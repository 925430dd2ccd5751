//! Fixed market data, for offline runs.

use async_trait::async_trait;

use crate::ports::{DataFetchError, MarketDataSource, MarketSnapshot};

/// Returns the same price and volume for every ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMarketData {
    price: f64,
    volume: u64,
}

impl StaticMarketData {
    pub fn new(price: f64, volume: u64) -> Self {
        Self { price, volume }
    }
}

impl Default for StaticMarketData {
    fn default() -> Self {
        Self::new(123.45, 1_000_000)
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, DataFetchError> {
        Ok(MarketSnapshot::new(ticker, self.price, self.volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_fixed_snapshot() {
        let value = StaticMarketData::default().snapshot_or_empty("AAPL").await;
        assert_eq!(value, json!({"ticker": "AAPL", "price": 123.45, "volume": 1_000_000}));
    }
}
