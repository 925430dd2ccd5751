//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ReasoningBackend` - The language model that drives an agent's cycles
//! - `MarketDataSource` - Price snapshots for the market data tool
//! - `ModelHealthCheck` - Availability of a local inference server and model

mod market_data;
mod model_health;
mod reasoning_backend;

pub use market_data::{DataFetchError, MarketDataSource, MarketSnapshot};
pub use model_health::{HealthReport, ModelHealthCheck};
pub use reasoning_backend::{
    BackendError, BackendInfo, BackendRequest, BackendResponse, ReasoningBackend, StopReason,
};
