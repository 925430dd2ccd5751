//! Anthropic Backend - ReasoningBackend over Anthropic's Messages API with tool use.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let backend = AnthropicBackend::new(config)?;
//! ```
//!
//! The base URL may contain a `{region}` placeholder, filled from the request's
//! [`BackendConfig::region`] or the configured default region.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::agent::{BackendConfig, Message, MessageContent, Role};
use crate::domain::foundation::ToolUseId;
use crate::domain::metrics::TokenUsage;
use crate::domain::tools::{ToolInvocation, ToolSpec};
use crate::ports::{BackendError, BackendInfo, BackendRequest, BackendResponse, ReasoningBackend, StopReason};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_key: Secret<String>,
    /// Model used when a request does not name one.
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Substituted for `{region}` in the base URL.
    pub region: String,
    /// Retries on transient failures. None by default.
    pub max_retries: u32,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            region: "us-west-2".to_string(),
            max_retries: 0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BackendError::network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self, config: &BackendConfig) -> String {
        let base = config.endpoint.as_deref().unwrap_or(&self.config.base_url);
        let region = config.region.as_deref().unwrap_or(&self.config.region);
        format!("{}/v1/messages", base.trim_end_matches('/').replace("{region}", region))
    }

    fn model<'a>(&'a self, config: &'a BackendConfig) -> &'a str {
        if config.model_id.trim().is_empty() {
            &self.config.model
        } else {
            &config.model_id
        }
    }

    /// Converts our request to Anthropic's format.
    fn to_anthropic_request(&self, request: &BackendRequest) -> AnthropicRequest {
        let messages = request
            .messages
            .iter()
            .map(to_anthropic_message)
            .filter(|message| !message.content.is_empty())
            .collect();

        AnthropicRequest {
            model: self.model(&request.config).to_string(),
            system: (!request.system_prompt.is_empty()).then(|| request.system_prompt.clone()),
            messages,
            tools: request.tools.iter().map(ToolSpec::to_anthropic_format).collect(),
            max_tokens: request.config.max_tokens,
            temperature: request.config.temperature,
            top_p: request.config.top_p,
        }
    }

    async fn send_request(&self, request: &BackendRequest) -> Result<Response, BackendError> {
        let body = self.to_anthropic_request(request);
        let timeout = request.config.request_timeout;

        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending Anthropic request"
        );

        self.client
            .post(self.messages_url(&request.config))
            .timeout(timeout)
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    BackendError::network(format!("Connection failed: {}", e))
                } else {
                    BackendError::network(e.to_string())
                }
            })
    }

    /// Maps error statuses to backend errors.
    async fn handle_response_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(BackendError::AuthenticationFailed),
            429 => Err(BackendError::rate_limited(Self::parse_retry_after(&error_body))),
            400 | 404 | 413 | 422 => Err(BackendError::invalid_request(error_body)),
            500..=599 => Err(BackendError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(BackendError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses "try again in Ns" from an error body; 60 seconds otherwise.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let rest = &message[message.find("try again in ")? + 13..];
                let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                rest[..end].parse::<u32>().ok()
            })
            .unwrap_or(60)
    }

    async fn parse_response(response: Response) -> Result<BackendResponse, BackendError> {
        let response = Self::handle_response_status(response).await?;
        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| BackendError::parse(format!("Failed to parse response: {}", e)))?;
        from_anthropic_response(body)
    }

    async fn respond_once(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let response = self.send_request(request).await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl ReasoningBackend for AnthropicBackend {
    async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let mut retry_count = 0;
        loop {
            match self.respond_once(&request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s, ...
                    let delay = Duration::from_secs(1 << retry_count.min(6));
                    tracing::warn!(error = %err, attempt = retry_count + 1, "Anthropic request failed, retrying");
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo::new("anthropic", &self.config.model)
    }
}

fn to_anthropic_message(message: &Message) -> AnthropicMessage {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    let content = message
        .content
        .iter()
        .filter_map(|part| match part {
            MessageContent::Text(text) if text.is_empty() => None,
            MessageContent::Text(text) => Some(AnthropicBlock::Text { text: text.clone() }),
            MessageContent::ToolUse(invocation) => Some(AnthropicBlock::ToolUse {
                id: invocation.tool_use_id().to_string(),
                name: invocation.tool_name().to_string(),
                input: invocation.input().clone(),
            }),
            MessageContent::ToolResult(result) => Some(AnthropicBlock::ToolResult {
                tool_use_id: result.tool_use_id().to_string(),
                content: result.text(),
                is_error: !result.is_success(),
            }),
        })
        .collect();
    AnthropicMessage {
        role: role.to_string(),
        content,
    }
}

fn from_anthropic_response(body: AnthropicResponse) -> Result<BackendResponse, BackendError> {
    let mut text = Vec::new();
    let mut invocations = Vec::new();
    for block in body.content {
        match block {
            AnthropicBlock::Text { text: part } => text.push(part),
            AnthropicBlock::ToolUse { id, name, input } => {
                let id = ToolUseId::new(id).map_err(|e| BackendError::parse(e.to_string()))?;
                invocations.push(ToolInvocation::new(id, name, input));
            }
            AnthropicBlock::ToolResult { .. } | AnthropicBlock::Unknown => {}
        }
    }

    let stop_reason = match body.stop_reason.as_deref() {
        Some("end_turn") | Some("stop_sequence") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::Other,
    };

    Ok(BackendResponse {
        text: text.join(""),
        invocations,
        usage: TokenUsage::new(body.usage.input_tokens, body.usage.output_tokens),
        stop_reason,
    })
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::{InputSchema, ParamKind, ParamSpec, ToolResult};
    use serde_json::json;

    fn backend() -> AnthropicBackend {
        AnthropicBackend::new(AnthropicConfig::new("test-key")).unwrap()
    }

    fn request(messages: Vec<Message>) -> BackendRequest {
        let spec = ToolSpec::new(
            "market_data",
            "Retrieve current market data",
            InputSchema::new().with_param(ParamSpec::required("ticker", ParamKind::String, "Ticker")),
        )
        .unwrap();
        BackendRequest {
            system_prompt: "You are a financial analyst.".to_string(),
            messages,
            tools: vec![spec],
            config: BackendConfig::new("claude-sonnet-4-20250514"),
        }
    }

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new("test-key")
            .with_model("claude-3-7-sonnet")
            .with_base_url("https://bedrock-runtime.{region}.example.com")
            .with_region("eu-west-1")
            .with_max_retries(2);

        assert_eq!(config.model, "claude-3-7-sonnet");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn region_placeholder_is_substituted() {
        let backend = AnthropicBackend::new(
            AnthropicConfig::new("k").with_base_url("https://{region}.example.com/"),
        )
        .unwrap();
        let config = BackendConfig::new("m");
        assert_eq!(backend.messages_url(&config), "https://us-west-2.example.com/v1/messages");

        let config = config.with_region("ap-south-1");
        assert_eq!(backend.messages_url(&config), "https://ap-south-1.example.com/v1/messages");
    }

    #[test]
    fn request_carries_tool_blocks() {
        let invocation = ToolInvocation::new(
            ToolUseId::new("toolu_1").unwrap(),
            "market_data",
            json!({"ticker": "AAPL"}),
        );
        let result = ToolResult::error(ToolUseId::new("toolu_1").unwrap(), "boom");
        let body = backend().to_anthropic_request(&request(vec![
            Message::user("What is AAPL doing?"),
            Message::assistant("", vec![invocation]),
            Message::tool_results(vec![result]),
        ]));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["system"], "You are a financial analyst.");
        assert_eq!(value["tools"][0]["name"], "market_data");
        assert_eq!(value["messages"][0]["content"][0], json!({"type": "text", "text": "What is AAPL doing?"}));
        assert_eq!(
            value["messages"][1]["content"][0],
            json!({"type": "tool_use", "id": "toolu_1", "name": "market_data", "input": {"ticker": "AAPL"}})
        );
        assert_eq!(
            value["messages"][2]["content"][0],
            json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "boom", "is_error": true})
        );
    }

    #[test]
    fn response_with_tool_use_is_parsed() {
        let body: AnthropicResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_9", "name": "market_data", "input": {"ticker": "MSFT"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 30}
        }))
        .unwrap();

        let response = from_anthropic_response(body).unwrap();
        assert_eq!(response.text, "Let me check.");
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage, TokenUsage::new(120, 30));
        assert_eq!(response.invocations.len(), 1);
        assert_eq!(response.invocations[0].tool_use_id().as_str(), "toolu_9");
        assert!(!response.is_final());
    }

    #[test]
    fn unknown_blocks_are_ignored() {
        let body: AnthropicResponse = serde_json::from_value(json!({
            "content": [{"type": "thinking", "thinking": "hmm"}, {"type": "text", "text": "Done"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 2}
        }))
        .unwrap();
        let response = from_anthropic_response(body).unwrap();
        assert_eq!(response.text, "Done");
        assert!(response.is_final());
    }

    #[test]
    fn parse_retry_after_reads_message() {
        let error = r#"{"error":{"message":"Rate limited, try again in 12s"}}"#;
        assert_eq!(AnthropicBackend::parse_retry_after(error), 12);
        assert_eq!(AnthropicBackend::parse_retry_after("not json"), 60);
    }
}
