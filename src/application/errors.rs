//! Errors raised while building or running a desk.

use thiserror::Error;

use crate::config;
use crate::domain::agent::{AgentError, GraphError};
use crate::domain::foundation::ValidationError;
use crate::ports::BackendError;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ValidationError),

    #[error("{0}")]
    Agent(#[from] AgentError),

    #[error("{0}")]
    Graph(#[from] GraphError),

    #[error("Invalid tool definition: {0}")]
    Tool(#[from] ValidationError),

    #[error("Backend setup failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Market data source setup failed: {0}")]
    MarketData(String),

    #[error("Agent '{0}' missing from the built graph")]
    MissingAgent(String),
}

impl DeskError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeskError::Agent(err) => err.is_retryable(),
            DeskError::Backend(err) => err.is_retryable(),
            _ => false,
        }
    }
}
