//! `market_data` tool - current price snapshot from a [`MarketDataSource`].

use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{
    async_handler_fn, str_param, InputSchema, ParamKind, ParamSpec, ToolFailure, ToolOutput,
    ToolSpec,
};
use crate::ports::MarketDataSource;

use super::ToolBinding;

pub const MARKET_DATA: &str = "market_data";

pub fn market_data_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        MARKET_DATA,
        "Retrieve current market data for a given ticker symbol from an API.",
        InputSchema::new().with_param(ParamSpec::required(
            "ticker",
            ParamKind::String,
            "The stock ticker symbol (e.g., AAPL, GOOGL)",
        )),
    )
}

/// Binds the tool to `source`.
///
/// Fetch failures do not fail the tool: the output is an empty JSON object.
pub fn market_data_tool(source: Arc<dyn MarketDataSource>) -> Result<ToolBinding, ValidationError> {
    let handler = async_handler_fn(move |input| {
        let source = source.clone();
        async move {
            let ticker = str_param(&input, "ticker")?.to_uppercase();
            Ok::<_, ToolFailure>(ToolOutput::json(source.snapshot_or_empty(&ticker).await))
        }
    });
    Ok((market_data_spec()?, handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::ContentBlock;
    use crate::ports::{DataFetchError, MarketSnapshot};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed;

    #[async_trait]
    impl MarketDataSource for Fixed {
        async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, DataFetchError> {
            if ticker == "GOOGL" {
                Ok(MarketSnapshot::new(ticker, 171.5, 2_000_000))
            } else {
                Err(DataFetchError::MissingSnapshot)
            }
        }
    }

    #[tokio::test]
    async fn returns_snapshot_as_json() {
        let (spec, handler) = market_data_tool(Arc::new(Fixed)).unwrap();
        assert_eq!(spec.name(), MARKET_DATA);

        let output = handler.call(json!({"ticker": "googl"})).await.unwrap();
        assert_eq!(
            output.content(),
            &[ContentBlock::Json(json!({"ticker": "GOOGL", "price": 171.5, "volume": 2_000_000}))]
        );
    }

    #[tokio::test]
    async fn fetch_failure_yields_empty_object() {
        let (_, handler) = market_data_tool(Arc::new(Fixed)).unwrap();
        let output = handler.call(json!({"ticker": "ZZZZ"})).await.unwrap();
        assert_eq!(output.content(), &[ContentBlock::Json(json!({}))]);
    }
}
