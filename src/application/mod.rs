//! Application layer - desks that wire agents, tools and backends together.
//!
//! - `TradingDesk` - four analysis specialists behind a trading coordinator
//! - `MarketDesk` - a single agent answering with live market data
//! - `bootstrap` - turns [`AppConfig`](crate::config::AppConfig) into ports
//! - `report` - plain-text rendering of answers and metrics

pub mod bootstrap;
pub mod report;

mod errors;
mod market_desk;
mod trading_desk;

pub use bootstrap::{build_backend, build_market_source, offline};
pub use errors::DeskError;
pub use market_desk::{MarketDesk, MarketQuery};
pub use trading_desk::{AnalyzeStockCommand, Specialist, TradingDesk, TRADING_ADVISOR};
