//! Reasoning Backend Port - Interface for the language model behind an agent.
//!
//! One call is one reasoning cycle: the backend receives the system prompt,
//! the conversation so far, the tools it may call and the sampling
//! configuration, and answers with text and zero or more tool invocations.
//! A response without invocations is a final answer.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoBackend;
//!
//! #[async_trait]
//! impl ReasoningBackend for EchoBackend {
//!     async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
//!         Ok(BackendResponse::final_text("echo", TokenUsage::zero()))
//!     }
//!
//!     fn backend_info(&self) -> BackendInfo {
//!         BackendInfo::new("echo", "echo-1")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::agent::{BackendConfig, Message};
use crate::domain::metrics::TokenUsage;
use crate::domain::tools::{ToolInvocation, ToolSpec};

/// Port for the reasoning service (remote or local inference).
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Runs one reasoning cycle.
    async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;

    /// Name and model of the backend.
    fn backend_info(&self) -> BackendInfo;
}

/// Input of one reasoning cycle.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub system_prompt: String,
    /// Conversation history, oldest first. Starts with the user query.
    pub messages: Vec<Message>,
    /// Tools the backend may invoke.
    pub tools: Vec<ToolSpec>,
    /// Model identifier and sampling configuration.
    pub config: BackendConfig,
}

/// Output of one reasoning cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    /// Text produced in this cycle. May be empty when only tools are called.
    pub text: String,
    /// Tool invocations in the order the backend requested them.
    pub invocations: Vec<ToolInvocation>,
    pub usage: TokenUsage,
    pub stop_reason: StopReason,
}

impl BackendResponse {
    /// A final answer.
    pub fn final_text(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            invocations: Vec::new(),
            usage,
            stop_reason: StopReason::EndTurn,
        }
    }

    /// A cycle that requests tool calls.
    pub fn tool_calls(invocations: Vec<ToolInvocation>, usage: TokenUsage) -> Self {
        Self {
            text: String::new(),
            invocations,
            usage,
            stop_reason: StopReason::ToolUse,
        }
    }

    /// Sets the accompanying text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// True when no tool invocations are pending.
    pub fn is_final(&self) -> bool {
        self.invocations.is_empty()
    }
}

/// Why the backend stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other,
}

/// Backend name and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name (e.g., "anthropic", "ollama").
    pub name: String,
    pub model: String,
}

impl BackendInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Backend transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Rate limited by the service.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Service is unreachable or failing.
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the service response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Service rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl BackendError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::RateLimited { .. }
                | BackendError::Unavailable { .. }
                | BackendError::Network(_)
                | BackendError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn final_text_has_no_invocations() {
        let response = BackendResponse::final_text("done", TokenUsage::new(10, 2));
        assert!(response.is_final());
        assert_eq!(response.stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn tool_calls_is_not_final() {
        let response = BackendResponse::tool_calls(
            vec![ToolInvocation::generated("market_data", json!({"ticker": "AAPL"}))],
            TokenUsage::zero(),
        )
        .with_text("Let me check.");

        assert!(!response.is_final());
        assert_eq!(response.text, "Let me check.");
        assert_eq!(response.stop_reason, StopReason::ToolUse);
    }

    #[test]
    fn backend_error_retryable_classification() {
        assert!(BackendError::rate_limited(30).is_retryable());
        assert!(BackendError::unavailable("down").is_retryable());
        assert!(BackendError::network("reset").is_retryable());
        assert!(BackendError::Timeout { timeout_secs: 60 }.is_retryable());

        assert!(!BackendError::AuthenticationFailed.is_retryable());
        assert!(!BackendError::parse("bad json").is_retryable());
        assert!(!BackendError::invalid_request("too long").is_retryable());
    }

    #[test]
    fn backend_error_displays_correctly() {
        assert_eq!(
            BackendError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            BackendError::unavailable("connection refused").to_string(),
            "backend unavailable: connection refused"
        );
    }

    #[test]
    fn stop_reason_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&StopReason::EndTurn).unwrap(), "\"end_turn\"");
        assert_eq!(serde_json::to_string(&StopReason::ToolUse).unwrap(), "\"tool_use\"");
    }
}
