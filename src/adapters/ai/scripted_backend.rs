//! Scripted Backend for tests and offline runs.
//!
//! Provides a configurable implementation of the ReasoningBackend port that
//! never leaves the process.
//!
//! # Features
//!
//! - Queued turns (final text, tool calls, errors), consumed in order
//! - Simulated delays for timeout and ordering tests
//! - Request recording for verification
//! - Autopilot: calls every offered tool once, then summarises the results
//!
//! # Example
//!
//! ```ignore
//! let backend = ScriptedBackend::new()
//!     .with_tool_call("market_data", json!({"ticker": "AAPL"}))
//!     .with_final("AAPL traded 1,000,000 shares.");
//!
//! let agent = Agent::new(id, config, Arc::new(backend.clone()));
//! agent.answer("What's the volume for AAPL?").await?;
//! assert_eq!(backend.call_count(), 2);
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::agent::{Message, MessageContent, Role};
use crate::domain::metrics::TokenUsage;
use crate::domain::tools::{ParamKind, ToolInvocation, ToolSpec};
use crate::ports::{BackendError, BackendInfo, BackendRequest, BackendResponse, ReasoningBackend};

/// One scripted reasoning cycle.
#[derive(Debug, Clone)]
pub enum ScriptedTurn {
    /// Answer with text and stop.
    Final { text: String, usage: TokenUsage },
    /// Request tool calls, in order.
    ToolCalls {
        text: String,
        calls: Vec<(String, Value)>,
        usage: TokenUsage,
    },
    /// Fail the cycle.
    Error(BackendError),
}

/// What to do once the script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exhausted {
    DefaultText,
    Autopilot,
}

/// Scripted reasoning backend.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    turns: Arc<Mutex<VecDeque<ScriptedTurn>>>,
    info: BackendInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<BackendRequest>>>,
    exhausted: Exhausted,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Creates a backend that answers "Scripted response" once its script is used up.
    pub fn new() -> Self {
        Self {
            turns: Arc::new(Mutex::new(VecDeque::new())),
            info: BackendInfo::new("scripted", "scripted-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            exhausted: Exhausted::DefaultText,
        }
    }

    /// Creates a backend that works through its tools without a script.
    ///
    /// On a fresh query it calls every offered tool once, filling the
    /// `ticker` parameter from the query and `query` with the query itself.
    /// When the results come back it answers with a summary of them.
    pub fn autopilot() -> Self {
        Self {
            exhausted: Exhausted::Autopilot,
            info: BackendInfo::new("scripted", "autopilot"),
            ..Self::new()
        }
    }

    /// Queues a turn.
    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner).push_back(turn);
        self
    }

    /// Queues a final answer.
    pub fn with_final(self, text: impl Into<String>) -> Self {
        self.with_final_usage(text, TokenUsage::new(10, 20))
    }

    pub fn with_final_usage(self, text: impl Into<String>, usage: TokenUsage) -> Self {
        self.with_turn(ScriptedTurn::Final {
            text: text.into(),
            usage,
        })
    }

    /// Queues a cycle with a single tool call.
    pub fn with_tool_call(self, tool: impl Into<String>, input: Value) -> Self {
        self.with_tool_calls(vec![(tool.into(), input)], TokenUsage::new(10, 5))
    }

    /// Queues a cycle with several tool calls.
    pub fn with_tool_calls(self, calls: Vec<(String, Value)>, usage: TokenUsage) -> Self {
        self.with_turn(ScriptedTurn::ToolCalls {
            text: String::new(),
            calls,
            usage,
        })
    }

    /// Queues a failing cycle.
    pub fn with_error(self, error: BackendError) -> Self {
        self.with_turn(ScriptedTurn::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backend_info(mut self, info: BackendInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of requests received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<BackendRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of turns not yet consumed.
    pub fn remaining(&self) -> usize {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_turn(&self, request: &BackendRequest) -> ScriptedTurn {
        if let Some(turn) = self.turns.lock().unwrap_or_else(PoisonError::into_inner).pop_front() {
            return turn;
        }
        match self.exhausted {
            Exhausted::DefaultText => ScriptedTurn::Final {
                text: "Scripted response".to_string(),
                usage: TokenUsage::new(5, 10),
            },
            Exhausted::Autopilot => autopilot_turn(request),
        }
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let turn = self.next_turn(&request);
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match turn {
            ScriptedTurn::Final { text, usage } => Ok(BackendResponse::final_text(text, usage)),
            ScriptedTurn::ToolCalls { text, calls, usage } => {
                let invocations = calls
                    .into_iter()
                    .map(|(name, input)| ToolInvocation::generated(name, input))
                    .collect();
                Ok(BackendResponse::tool_calls(invocations, usage).with_text(text))
            }
            ScriptedTurn::Error(err) => Err(err),
        }
    }

    fn backend_info(&self) -> BackendInfo {
        self.info.clone()
    }
}

fn autopilot_turn(request: &BackendRequest) -> ScriptedTurn {
    let query = request
        .messages
        .iter()
        .find(|message| message.role == Role::User)
        .map(Message::text)
        .unwrap_or_default();
    let prompt_tokens = estimate_tokens(&request.system_prompt)
        + request.messages.iter().map(|m| estimate_tokens(&m.text())).sum::<u64>();

    let last_has_results = request
        .messages
        .last()
        .map(|message| message.tool_results_iter().next().is_some())
        .unwrap_or(false);

    if last_has_results || request.tools.is_empty() {
        let text = summarise(&query, &request.messages);
        let usage = TokenUsage::new(prompt_tokens, estimate_tokens(&text));
        return ScriptedTurn::Final { text, usage };
    }

    let calls = request
        .tools
        .iter()
        .map(|spec| (spec.name().to_string(), fill_input(spec, &query)))
        .collect();
    ScriptedTurn::ToolCalls {
        text: String::new(),
        calls,
        usage: TokenUsage::new(prompt_tokens, 8 * request.tools.len() as u64),
    }
}

fn summarise(query: &str, messages: &[Message]) -> String {
    let results: Vec<String> = messages
        .iter()
        .flat_map(|message| message.content.iter())
        .filter_map(|part| match part {
            MessageContent::ToolResult(result) => Some(result.text()),
            _ => None,
        })
        .collect();
    if results.is_empty() {
        return format!("No tool results were gathered for: {}", query);
    }
    format!("Findings for: {}\n\n{}", query, results.join("\n\n"))
}

/// Builds tool input from the required parameters of `spec`.
fn fill_input(spec: &ToolSpec, query: &str) -> Value {
    let mut input = Map::new();
    for param in spec.input_schema().params().iter().filter(|p| p.is_required()) {
        let value = match (param.name(), param.kind()) {
            ("ticker", ParamKind::String) => Value::String(extract_ticker(query).unwrap_or("SPY").to_string()),
            (_, ParamKind::String) => Value::String(query.to_string()),
            _ => match param.default_value() {
                Some(default) => default.clone(),
                None => continue,
            },
        };
        input.insert(param.name().to_string(), value);
    }
    Value::Object(input)
}

/// First all-caps word of two to five letters.
pub fn extract_ticker(text: &str) -> Option<&str> {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '.')
        .map(|word| word.trim_end_matches('.'))
        .find(|word| (2..=5).contains(&word.len()) && word.chars().all(|c| c.is_ascii_uppercase()))
}

fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64 / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::BackendConfig;
    use crate::domain::foundation::ToolUseId;
    use crate::domain::tools::{ContentBlock, InputSchema, ParamSpec, ToolResult};
    use serde_json::json;

    fn request(messages: Vec<Message>, tools: Vec<ToolSpec>) -> BackendRequest {
        BackendRequest {
            system_prompt: "You are a test agent.".to_string(),
            messages,
            tools,
            config: BackendConfig::new("scripted-1"),
        }
    }

    fn ticker_tool(name: &str) -> ToolSpec {
        ToolSpec::new(
            name,
            "test tool",
            InputSchema::new().with_param(ParamSpec::required("ticker", ParamKind::String, "Ticker")),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn turns_are_consumed_in_order() {
        let backend = ScriptedBackend::new()
            .with_tool_call("market_data", json!({"ticker": "AAPL"}))
            .with_final("done");

        let first = backend.respond(request(vec![Message::user("q")], vec![])).await.unwrap();
        assert_eq!(first.invocations.len(), 1);
        assert_eq!(first.invocations[0].tool_name(), "market_data");

        let second = backend.respond(request(vec![Message::user("q")], vec![])).await.unwrap();
        assert_eq!(second.text, "done");
        assert!(second.is_final());
        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn default_response_when_script_runs_out() {
        let backend = ScriptedBackend::new();
        let response = backend.respond(request(vec![Message::user("q")], vec![])).await.unwrap();
        assert_eq!(response.text, "Scripted response");
    }

    #[tokio::test]
    async fn scripted_errors_are_returned() {
        let backend = ScriptedBackend::new().with_error(BackendError::AuthenticationFailed);
        let err = backend.respond(request(vec![], vec![])).await.unwrap_err();
        assert_eq!(err, BackendError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn clones_share_script_and_history() {
        let backend = ScriptedBackend::new().with_final("one");
        let clone = backend.clone();
        clone.respond(request(vec![], vec![])).await.unwrap();
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn autopilot_calls_every_tool_then_summarises() {
        let backend = ScriptedBackend::autopilot();
        let tools = vec![ticker_tool("get_price_history"), ticker_tool("identify_patterns")];
        let query = Message::user("Analyze the technical setup for NVDA.");

        let first = backend
            .respond(request(vec![query.clone()], tools.clone()))
            .await
            .unwrap();
        assert_eq!(first.invocations.len(), 2);
        assert_eq!(first.invocations[1].input(), &json!({"ticker": "NVDA"}));

        let results = Message::tool_results(vec![ToolResult::success(
            ToolUseId::generate(),
            vec![ContentBlock::Text("Technical Analysis for NVDA".into())],
        )]);
        let second = backend
            .respond(request(vec![query, Message::assistant("", first.invocations), results], tools))
            .await
            .unwrap();
        assert!(second.is_final());
        assert!(second.text.contains("Technical Analysis for NVDA"));
    }

    #[test]
    fn extract_ticker_skips_plain_words() {
        assert_eq!(extract_ticker("Should I buy AAPL shares?"), Some("AAPL"));
        assert_eq!(extract_ticker("What's the current market data for GOOGL?"), Some("GOOGL"));
        assert_eq!(extract_ticker("no tickers here"), None);
    }
}
