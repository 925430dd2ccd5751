//! Error types for agents and agent graphs.

use crate::domain::foundation::ValidationError;
use crate::domain::tools::RegistryError;
use crate::ports::BackendError;

/// Failures of agent construction or of an `answer()` call.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend could not be reached or would not serve this client.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(BackendError),

    #[error("Backend request timed out after {timeout_secs}s")]
    BackendTimeout { timeout_secs: u64 },

    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    #[error("Cycle limit of {limit} exceeded without a final answer")]
    CycleLimitExceeded { limit: u32 },

    #[error("Tool registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl AgentError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if the caller may retry the call.
    ///
    /// An unavailable backend is retryable unless it refused the credentials.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::BackendUnavailable(source) => source.is_retryable(),
            AgentError::BackendTimeout { .. } => true,
            _ => false,
        }
    }
}

impl From<BackendError> for AgentError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout { timeout_secs } => AgentError::BackendTimeout { timeout_secs },
            BackendError::RateLimited { .. }
            | BackendError::Unavailable { .. }
            | BackendError::Network(_)
            | BackendError::AuthenticationFailed => AgentError::BackendUnavailable(err),
            BackendError::Parse(_) | BackendError::InvalidRequest(_) => {
                AgentError::BackendRejected(err.to_string())
            }
        }
    }
}

impl From<ValidationError> for AgentError {
    fn from(err: ValidationError) -> Self {
        AgentError::Configuration(err.to_string())
    }
}

/// Failures while assembling a capability graph.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum GraphError {
    #[error("Cycle in agent graph: {}", .path.join(" -> "))]
    CycleInAgentGraph { path: Vec<String> },

    #[error("Agent '{0}' is declared more than once")]
    DuplicateAgent(String),

    #[error("Agent '{from}' delegates to unknown agent '{to}'")]
    UnknownAgent { from: String, to: String },

    #[error("Agent '{agent}' could not be built: {source}")]
    Agent {
        agent: String,
        #[source]
        source: AgentError,
    },
}
