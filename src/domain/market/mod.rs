//! Market analysis - the tools, prompts and query templates of the trading desk.
//!
//! Analysis tools report on generated data from [`MockMarketData`]; the
//! `market_data` tool reads a real [`MarketDataSource`](crate::ports::MarketDataSource).
//! Each `tools()` function returns `(spec, handler)` pairs ready for
//! [`AgentConfigBuilder::tool`](crate::domain::agent::AgentConfigBuilder::tool).

pub mod fundamental;
pub mod generators;
pub mod risk;
pub mod sentiment;
pub mod technical;

mod analysis;
mod market_data_tool;
mod prompts;

use std::sync::Arc;

use crate::domain::tools::{ParamKind, ParamSpec, ToolHandler, ToolSpec};

pub use analysis::AnalysisType;
pub use generators::MockMarketData;
pub use market_data_tool::{market_data_spec, market_data_tool, MARKET_DATA};
pub use prompts::*;

/// A tool spec with its implementation.
pub type ToolBinding = (ToolSpec, Arc<dyn ToolHandler>);

fn ticker_param(example: &str) -> ParamSpec {
    ParamSpec::required(
        "ticker",
        ParamKind::String,
        format!("Stock ticker symbol (e.g., {})", example),
    )
}
