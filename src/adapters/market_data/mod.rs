//! Market Data Adapters.
//!
//! - `FinancialDatasetsClient` - live snapshots over HTTP
//! - `StaticMarketData` - fixed snapshot for offline runs

mod financial_datasets;
mod static_data;

pub use financial_datasets::{FinancialDatasetsClient, FinancialDatasetsConfig, DEFAULT_BASE_URL};
pub use static_data::StaticMarketData;
