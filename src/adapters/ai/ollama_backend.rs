//! Ollama Backend - ReasoningBackend over a local Ollama server's chat API.
//!
//! Uses `POST {host}/api/chat` without streaming. Ollama does not assign
//! identifiers to tool calls, so each call gets a generated [`ToolUseId`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::agent::{BackendConfig, Message, MessageContent, Role};
use crate::domain::foundation::ToolUseId;
use crate::domain::metrics::TokenUsage;
use crate::domain::tools::{ToolInvocation, ToolSpec};
use crate::ports::{BackendError, BackendInfo, BackendRequest, BackendResponse, ReasoningBackend, StopReason};

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server address (default: http://localhost:11434).
    pub host: String,
    /// Model used when a request does not name one.
    pub model: String,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: model.into(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new("qwen3:8b-q8_0")
    }
}

/// Local Ollama backend.
pub struct OllamaBackend {
    config: OllamaConfig,
    client: Client,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BackendError::network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn chat_url(&self, config: &BackendConfig) -> String {
        let host = config.endpoint.as_deref().unwrap_or(&self.config.host);
        format!("{}/api/chat", host.trim_end_matches('/'))
    }

    fn to_chat_request(&self, request: &BackendRequest) -> ChatRequest {
        let model = if request.config.model_id.trim().is_empty() {
            self.config.model.clone()
        } else {
            request.config.model_id.clone()
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage::plain("system", request.system_prompt.clone()));
        }
        // Ollama correlates tool results by tool name.
        let mut tool_names: HashMap<&ToolUseId, &str> = HashMap::new();
        for message in &request.messages {
            for invocation in message.tool_uses() {
                tool_names.insert(invocation.tool_use_id(), invocation.tool_name());
            }
            messages.extend(to_chat_messages(message, &tool_names));
        }

        ChatRequest {
            model,
            messages,
            tools: request.tools.iter().map(ToolSpec::to_function_format).collect(),
            stream: false,
            options: ChatOptions {
                temperature: request.config.temperature,
                top_p: request.config.top_p,
                num_predict: request.config.max_tokens,
            },
        }
    }

    async fn handle_response_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            400 | 404 => Err(BackendError::invalid_request(format!(
                "Ollama rejected request ({}): {}",
                status, error_body
            ))),
            500..=599 => Err(BackendError::unavailable(format!(
                "Ollama server error {}: {}",
                status, error_body
            ))),
            _ => Err(BackendError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl ReasoningBackend for OllamaBackend {
    async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let body = self.to_chat_request(&request);
        let timeout = request.config.request_timeout;
        tracing::debug!(model = %body.model, messages = body.messages.len(), "Sending Ollama chat request");

        let response = self
            .client
            .post(self.chat_url(&request.config))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    BackendError::unavailable("Cannot connect to Ollama server. Is Ollama running?")
                } else {
                    BackendError::network(e.to_string())
                }
            })?;

        let response = Self::handle_response_status(response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::parse(format!("Failed to parse Ollama response: {}", e)))?;
        Ok(from_chat_response(body))
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo::new("ollama", &self.config.model)
    }
}

fn to_chat_messages(message: &Message, tool_names: &HashMap<&ToolUseId, &str>) -> Vec<ChatMessage> {
    match message.role {
        Role::Assistant => {
            let tool_calls = message
                .tool_uses()
                .map(|invocation| ChatToolCall {
                    function: ChatFunction {
                        name: invocation.tool_name().to_string(),
                        arguments: invocation.input().clone(),
                    },
                })
                .collect();
            vec![ChatMessage {
                role: "assistant".to_string(),
                content: message.text(),
                tool_calls,
                tool_name: None,
            }]
        }
        Role::User => message
            .content
            .iter()
            .map(|part| match part {
                MessageContent::Text(text) => ChatMessage::plain("user", text.clone()),
                MessageContent::ToolUse(invocation) => {
                    ChatMessage::plain("user", invocation.input().to_string())
                }
                MessageContent::ToolResult(result) => ChatMessage {
                    role: "tool".to_string(),
                    content: result.text(),
                    tool_calls: Vec::new(),
                    tool_name: tool_names.get(result.tool_use_id()).map(|name| name.to_string()),
                },
            })
            .collect(),
    }
}

fn from_chat_response(body: ChatResponse) -> BackendResponse {
    let invocations: Vec<ToolInvocation> = body
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = match call.function.arguments {
                // Some models return arguments as a JSON string.
                Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
                other => other,
            };
            ToolInvocation::generated(call.function.name, arguments)
        })
        .collect();

    let stop_reason = if !invocations.is_empty() {
        StopReason::ToolUse
    } else {
        match body.done_reason.as_deref() {
            Some("stop") | None => StopReason::EndTurn,
            Some("length") => StopReason::MaxTokens,
            Some(_) => StopReason::Other,
        }
    };

    BackendResponse {
        text: strip_thinking(&body.message.content),
        invocations,
        usage: TokenUsage::new(body.prompt_eval_count, body.eval_count),
        stop_reason,
    }
}

/// Removes a leading `<think>...</think>` block emitted by reasoning models.
fn strip_thinking(content: &str) -> String {
    match (content.find("<think>"), content.find("</think>")) {
        (Some(start), Some(end)) if start < end => {
            let mut text = String::with_capacity(content.len());
            text.push_str(&content[..start]);
            text.push_str(&content[end + "</think>".len()..]);
            text.trim().to_string()
        }
        _ => content.to_string(),
    }
}

// ----- Ollama API Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl ChatMessage {
    fn plain(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    function: ChatFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::{InputSchema, ParamKind, ParamSpec, ToolResult};
    use serde_json::json;

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
            config: BackendConfig::new("qwen3:8b-q8_0").with_max_tokens(1024),
        }
    }

    #[test]
    fn chat_request_shape() {
        let backend = OllamaBackend::new(OllamaConfig::default()).unwrap();
        let invocation = ToolInvocation::generated("market_data", json!({"ticker": "AAPL"}));
        let result = ToolResult::success(
            invocation.tool_use_id().clone(),
            vec![crate::domain::tools::ContentBlock::Text("price 123.45".into())],
        );
        let body = backend.to_chat_request(&request(vec![
            Message::user("AAPL volume?"),
            Message::assistant("", vec![invocation]),
            Message::tool_results(vec![result]),
        ]));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 1024);
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1], json!({"role": "user", "content": "AAPL volume?"}));
        assert_eq!(
            value["messages"][2]["tool_calls"][0]["function"],
            json!({"name": "market_data", "arguments": {"ticker": "AAPL"}})
        );
        assert_eq!(
            value["messages"][3],
            json!({"role": "tool", "content": "price 123.45", "tool_name": "market_data"})
        );
    }

    #[test]
    fn tool_calls_get_generated_ids() {
        let body: ChatResponse = serde_json::from_value(json!({
            "model": "qwen3:8b-q8_0",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "market_data", "arguments": {"ticker": "AAPL"}}},
                    {"function": {"name": "market_data", "arguments": "{\"ticker\": \"MSFT\"}"}}
                ]
            },
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 50,
            "eval_count": 12
        }))
        .unwrap();

        let response = from_chat_response(body);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage, TokenUsage::new(50, 12));
        assert_eq!(response.invocations.len(), 2);
        assert_ne!(response.invocations[0].tool_use_id(), response.invocations[1].tool_use_id());
        assert_eq!(response.invocations[1].input(), &json!({"ticker": "MSFT"}));
    }

    #[test]
    fn thinking_block_is_stripped() {
        assert_eq!(strip_thinking("<think>\nhmm\n</think>\n\nAAPL trades at 123.45"), "AAPL trades at 123.45");
        assert_eq!(strip_thinking("plain answer"), "plain answer");
    }
}
