//! Agent - a system prompt and tool registry driven by a reasoning backend.
//!
//! # Reasoning loop
//!
//! Each cycle sends the system prompt, the conversation so far, the tool
//! specs and the backend configuration to the backend:
//!
//! 1. A response without invocations is the final answer.
//! 2. Otherwise every invocation is dispatched and exactly one result per
//!    invocation is appended to the conversation, in request order.
//! 3. After `max_cycles` cycles without a final answer the call fails.
//!
//! Backend failures abort the call and are never retried here.
//! [`Agent::try_answer`] still reports the metrics of an aborted call.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::foundation::{AgentId, Timestamp};
use crate::domain::metrics::{DelegationReport, InvocationMetrics};
use crate::domain::tools::{ToolInvocation, ToolResult};
use crate::ports::{BackendRequest, BackendResponse, ReasoningBackend};

use super::{AgentConfig, AgentError, Message, ToolExecution};

/// Answer to one `answer()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// Agent that produced the answer.
    pub agent: AgentId,
    /// Final answer text.
    pub text: String,
    /// This agent's own cycles, tokens and tool calls.
    pub metrics: InvocationMetrics,
    /// Metrics of every delegated agent call, in the order they completed
    /// within the conversation.
    pub delegations: Vec<DelegationReport>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl AgentResponse {
    /// This agent's metrics merged with every delegated call's.
    pub fn combined_metrics(&self) -> InvocationMetrics {
        self.delegations
            .iter()
            .fold(self.metrics.clone(), |acc, delegation| {
                InvocationMetrics::merge(&acc, &delegation.metrics)
            })
    }

    /// Number of reasoning cycles this agent ran.
    pub fn cycles(&self) -> usize {
        self.metrics.cycle_durations().len()
    }

    /// Wall time of the whole call, delegations included.
    pub fn wall_time(&self) -> std::time::Duration {
        self.finished_at.since(&self.started_at)
    }
}

/// A failed `answer()` call and everything it consumed before failing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFailure {
    pub error: AgentError,
    /// Cycles, tokens and tool calls up to and including the failing cycle.
    pub metrics: InvocationMetrics,
    pub delegations: Vec<DelegationReport>,
}

impl AnswerFailure {
    pub fn combined_metrics(&self) -> InvocationMetrics {
        self.delegations
            .iter()
            .fold(self.metrics.clone(), |acc, delegation| {
                InvocationMetrics::merge(&acc, &delegation.metrics)
            })
    }
}

/// An agent: configuration plus the backend that reasons for it.
///
/// Specialists and coordinators are the same type; a coordinator simply has
/// other agents among its tools.
#[derive(Clone)]
pub struct Agent {
    id: AgentId,
    config: Arc<AgentConfig>,
    backend: Arc<dyn ReasoningBackend>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("tools", &self.config.registry().tool_names())
            .field("backend", &self.backend.backend_info())
            .finish()
    }
}

impl Agent {
    pub fn new(id: AgentId, config: AgentConfig, backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            id,
            config: Arc::new(config),
            backend,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answers one query.
    pub async fn answer(&self, query: &str) -> Result<AgentResponse, AgentError> {
        self.try_answer(query).await.map_err(|failure| failure.error)
    }

    /// Answers one query, keeping what a failed call consumed.
    pub async fn try_answer(&self, query: &str) -> Result<AgentResponse, AnswerFailure> {
        let started_at = Timestamp::now();
        let tools = self.config.registry().specs();
        let max_cycles = self.config.max_cycles();

        let mut metrics = InvocationMetrics::new();
        let mut delegations = Vec::new();
        let mut messages = vec![Message::user(query)];

        tracing::info!(agent = %self.id, tools = tools.len(), "Agent answering query");

        for cycle in 1..=max_cycles {
            let cycle_started = Instant::now();
            let request = BackendRequest {
                system_prompt: self.config.system_prompt().to_string(),
                messages: messages.clone(),
                tools: tools.clone(),
                config: self.config.backend().clone(),
            };

            let response = match self.request(request).await {
                Ok(response) => response,
                Err(error) => {
                    metrics.record_cycle(cycle_started.elapsed());
                    return Err(AnswerFailure {
                        error,
                        metrics,
                        delegations,
                    });
                }
            };
            metrics.add_usage(response.usage);

            if response.is_final() {
                metrics.record_cycle(cycle_started.elapsed());
                tracing::info!(
                    agent = %self.id,
                    cycles = cycle,
                    total_tokens = metrics.total_tokens(),
                    "Agent finished"
                );
                return Ok(AgentResponse {
                    agent: self.id.clone(),
                    text: response.text,
                    metrics,
                    delegations,
                    started_at,
                    finished_at: Timestamp::now(),
                });
            }

            let BackendResponse {
                text, invocations, ..
            } = response;
            let mut results = self.run_tools(&invocations, &mut metrics).await;
            delegations.extend(results.iter_mut().filter_map(ToolResult::take_delegation));

            messages.push(Message::assistant(text, invocations));
            messages.push(Message::tool_results(results));
            metrics.record_cycle(cycle_started.elapsed());
        }

        tracing::warn!(agent = %self.id, limit = max_cycles, "Cycle limit exceeded");
        Err(AnswerFailure {
            error: AgentError::CycleLimitExceeded { limit: max_cycles },
            metrics,
            delegations,
        })
    }

    async fn request(&self, request: BackendRequest) -> Result<BackendResponse, AgentError> {
        let timeout = self.config.backend().request_timeout;
        tracing::debug!(
            agent = %self.id,
            messages = request.messages.len(),
            "Sending backend request"
        );

        match tokio::time::timeout(timeout, self.backend.respond(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    agent = %self.id,
                    invocations = response.invocations.len(),
                    total_tokens = response.usage.total_tokens,
                    "Backend responded"
                );
                Ok(response)
            }
            Ok(Err(err)) => {
                tracing::error!(agent = %self.id, error = %err, "Backend request failed");
                Err(err.into())
            }
            Err(_) => {
                tracing::error!(agent = %self.id, timeout_secs = timeout.as_secs(), "Backend request timed out");
                Err(AgentError::BackendTimeout {
                    timeout_secs: timeout.as_secs(),
                })
            }
        }
    }

    /// Runs one cycle's invocations; results come back in request order.
    async fn run_tools(
        &self,
        invocations: &[ToolInvocation],
        metrics: &mut InvocationMetrics,
    ) -> Vec<ToolResult> {
        let outcomes = match self.config.tool_execution() {
            ToolExecution::Concurrent => {
                join_all(invocations.iter().cloned().map(|inv| self.execute(inv))).await
            }
            ToolExecution::Sequential => {
                let mut outcomes = Vec::with_capacity(invocations.len());
                for invocation in invocations.iter().cloned() {
                    outcomes.push(self.execute(invocation).await);
                }
                outcomes
            }
        };

        invocations
            .iter()
            .zip(outcomes)
            .map(|(invocation, (result, elapsed))| {
                metrics.record_tool(invocation.tool_name(), result.is_success(), elapsed);
                result
            })
            .collect()
    }

    /// Dispatches one invocation; registry rejections become error results.
    async fn execute(&self, invocation: ToolInvocation) -> (ToolResult, Duration) {
        let tool_use_id = invocation.tool_use_id().clone();
        let tool = invocation.tool_name().to_string();
        let started = Instant::now();

        let result = match self.config.registry().dispatch(invocation).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(agent = %self.id, tool = %tool, error = %err, "Tool invocation rejected");
                ToolResult::error(tool_use_id, err.to_string())
            }
        };
        (result, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{AgentTool, BackendConfig, CoordinatorBuilder};
    use crate::domain::foundation::ToolUseId;
    use crate::domain::metrics::TokenUsage;
    use crate::domain::tools::{
        handler_fn, InputSchema, ParamKind, ParamSpec, ToolOutput, ToolSpec, ToolStatus,
    };
    use crate::ports::{BackendError, BackendInfo};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct QueueBackend {
        turns: Mutex<VecDeque<Result<BackendResponse, BackendError>>>,
        requests: Mutex<Vec<BackendRequest>>,
        delay: Duration,
    }

    impl QueueBackend {
        fn new(turns: Vec<Result<BackendResponse, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                turns: Mutex::new(turns.into()),
                requests: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            })
        }
    }

    #[async_trait]
    impl ReasoningBackend for QueueBackend {
        async fn respond(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
            self.requests.lock().unwrap().push(request);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(BackendResponse::final_text("done", TokenUsage::zero())))
        }

        fn backend_info(&self) -> BackendInfo {
            BackendInfo::new("queue", "queue-1")
        }
    }

    fn call(id: &str, tool: &str, input: serde_json::Value) -> ToolInvocation {
        ToolInvocation::new(ToolUseId::new(id).unwrap(), tool, input)
    }

    fn x_tool_config() -> AgentConfig {
        AgentConfig::builder("You answer with tools.")
            .tool(
                ToolSpec::new("always_x", "Returns X", InputSchema::new()).unwrap(),
                handler_fn(|_| Ok(ToolOutput::text("X"))),
            )
            .build()
            .unwrap()
    }

    fn agent(name: &str, config: AgentConfig, backend: Arc<dyn ReasoningBackend>) -> Agent {
        Agent::new(AgentId::new(name).unwrap(), config, backend)
    }

    #[tokio::test]
    async fn answer_without_tools_is_single_cycle() {
        let backend = QueueBackend::new(vec![Ok(BackendResponse::final_text(
            "AAPL looks fine",
            TokenUsage::new(12, 4),
        ))]);
        let response = agent("analyst", x_tool_config(), backend).answer("AAPL?").await.unwrap();

        assert_eq!(response.text, "AAPL looks fine");
        assert_eq!(response.cycles(), 1);
        assert_eq!(response.metrics.total_tokens(), 16);
        assert!(response.metrics.tool_metrics().is_empty());
        assert!(!response.finished_at.is_before(&response.started_at));
    }

    #[tokio::test]
    async fn tool_result_is_fed_back_before_final_answer() {
        let backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("t1", "always_x", json!({}))],
                TokenUsage::new(10, 5),
            )),
            Ok(BackendResponse::final_text("The tool said X", TokenUsage::new(20, 5))),
        ]);
        let response = agent("analyst", x_tool_config(), backend.clone())
            .answer("What does the tool say?")
            .await
            .unwrap();

        assert!(response.text.contains('X'));
        assert_eq!(response.metrics.call_count("always_x"), 1);
        assert_eq!(response.metrics.cycle_durations().len(), 2);
        assert_eq!(response.metrics.total_tokens(), 40);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert_eq!(second.messages.len(), 3);
        let result = second.messages[2].tool_results_iter().next().unwrap();
        assert_eq!(result.tool_use_id().as_str(), "t1");
        assert_eq!(result.text(), "X");
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_result_and_counts_as_error() {
        let backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("t1", "no_such_tool", json!({}))],
                TokenUsage::zero(),
            )),
            Ok(BackendResponse::final_text("gave up", TokenUsage::zero())),
        ]);
        let response = agent("analyst", x_tool_config(), backend.clone())
            .answer("q")
            .await
            .unwrap();

        let metric = response.metrics.tool_metrics()["no_such_tool"];
        assert_eq!(metric.call_count, 1);
        assert_eq!(metric.error_count, 1);

        let requests = backend.requests.lock().unwrap();
        let result = requests[1].messages[2].tool_results_iter().next().unwrap();
        assert_eq!(result.status(), ToolStatus::Error);
        assert!(result.text().contains("unknown tool"));
    }

    #[tokio::test]
    async fn cycle_limit_is_enforced() {
        let looping: Vec<_> = (0..5)
            .map(|i| {
                Ok(BackendResponse::tool_calls(
                    vec![call(&format!("t{}", i), "always_x", json!({}))],
                    TokenUsage::zero(),
                ))
            })
            .collect();
        let config = AgentConfig::builder("loop")
            .tool(
                ToolSpec::new("always_x", "Returns X", InputSchema::new()).unwrap(),
                handler_fn(|_| Ok(ToolOutput::text("X"))),
            )
            .max_cycles(3)
            .build()
            .unwrap();

        let err = agent("looper", config, QueueBackend::new(looping))
            .answer("q")
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::CycleLimitExceeded { limit: 3 });
    }

    #[tokio::test]
    async fn backend_failure_aborts_the_call() {
        let backend = QueueBackend::new(vec![Err(BackendError::network("connection refused"))]);
        let err = agent("analyst", x_tool_config(), backend)
            .answer("q")
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::BackendUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let backend = Arc::new(QueueBackend {
            turns: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::from_secs(5),
        });
        let config = AgentConfig::builder("slow")
            .backend(BackendConfig::new("m").with_request_timeout(Duration::from_millis(20)))
            .build()
            .unwrap();

        let err = agent("slow", config, backend).answer("q").await.unwrap_err();
        assert!(matches!(err, AgentError::BackendTimeout { .. }));
    }

    #[tokio::test]
    async fn coordinator_collects_specialist_metrics_as_delegations() {
        let specialist_backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("s1", "always_x", json!({}))],
                TokenUsage::new(3, 3),
            )),
            Ok(BackendResponse::final_text("specialist says X", TokenUsage::new(4, 4))),
        ]);
        let specialist = Arc::new(agent("fundamental_analyst", x_tool_config(), specialist_backend));

        let coordinator_backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("c1", "fundamental_analyst", json!({"query": "valuation?"}))],
                TokenUsage::new(10, 10),
            )),
            Ok(BackendResponse::final_text("Buy, per specialist X", TokenUsage::new(10, 10))),
        ]);
        let coordinator = CoordinatorBuilder::new(AgentId::new("advisor").unwrap(), "Coordinate.")
            .specialist(AgentTool::new(specialist))
            .build(coordinator_backend)
            .unwrap();

        let response = coordinator.answer("Should I buy?").await.unwrap();

        assert_eq!(response.metrics.total_tokens(), 40);
        assert_eq!(response.metrics.tools_used(), vec!["fundamental_analyst"]);
        assert_eq!(response.delegations.len(), 1);
        assert_eq!(response.delegations[0].agent, "fundamental_analyst");
        assert_eq!(response.delegations[0].metrics.total_tokens(), 14);

        let combined = response.combined_metrics();
        assert_eq!(combined.total_tokens(), 54);
        assert_eq!(combined.call_count("always_x"), 1);
        assert_eq!(combined.cycle_durations().len(), 4);
    }

    #[tokio::test]
    async fn failing_specialist_is_reported_as_error_text() {
        let specialist_backend = QueueBackend::new(vec![Err(BackendError::unavailable("offline"))]);
        let specialist = Arc::new(agent("risk_analyst", x_tool_config(), specialist_backend));

        let coordinator_backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("c1", "risk_analyst", json!({"query": "risk?"}))],
                TokenUsage::zero(),
            )),
            Ok(BackendResponse::final_text("Risk unknown", TokenUsage::zero())),
        ]);
        let coordinator = CoordinatorBuilder::new(AgentId::new("advisor").unwrap(), "Coordinate.")
            .specialist(AgentTool::new(specialist).with_error_label("Risk analysis"))
            .build(coordinator_backend.clone())
            .unwrap();

        let response = coordinator.answer("q").await.unwrap();
        assert_eq!(response.text, "Risk unknown");
        assert_eq!(response.delegations.len(), 1);
        assert_eq!(response.delegations[0].agent, "risk_analyst");
        assert_eq!(response.delegations[0].metrics.cycle_durations().len(), 1);

        let requests = coordinator_backend.requests.lock().unwrap();
        let result = requests[1].messages[2].tool_results_iter().next().unwrap();
        assert_eq!(result.status(), ToolStatus::Error);
        assert!(result.text().starts_with("Risk analysis error: "));
    }

    #[tokio::test]
    async fn specialist_hitting_cycle_limit_still_reports_its_usage() {
        let looping: Vec<_> = (0..2)
            .map(|i| {
                Ok(BackendResponse::tool_calls(
                    vec![call(&format!("s{}", i), "always_x", json!({}))],
                    TokenUsage::new(6, 2),
                ))
            })
            .collect();
        let specialist_config = AgentConfig::builder("You answer with tools.")
            .tool(
                ToolSpec::new("always_x", "Returns X", InputSchema::new()).unwrap(),
                handler_fn(|_| Ok(ToolOutput::text("X"))),
            )
            .max_cycles(2)
            .build()
            .unwrap();
        let specialist = Arc::new(agent("technical_analyst", specialist_config, QueueBackend::new(looping)));

        let coordinator_backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("c1", "technical_analyst", json!({"query": "trend?"}))],
                TokenUsage::new(5, 5),
            )),
            Ok(BackendResponse::final_text("No trend call", TokenUsage::new(5, 5))),
        ]);
        let coordinator = CoordinatorBuilder::new(AgentId::new("advisor").unwrap(), "Coordinate.")
            .specialist(AgentTool::new(specialist))
            .build(coordinator_backend)
            .unwrap();

        let response = coordinator.answer("q").await.unwrap();
        assert_eq!(response.metrics.tool_metrics()["technical_analyst"].error_count, 1);

        let delegation = &response.delegations[0];
        assert_eq!(delegation.agent, "technical_analyst");
        assert_eq!(delegation.metrics.total_tokens(), 16);
        assert_eq!(delegation.metrics.call_count("always_x"), 2);

        let combined = response.combined_metrics();
        assert_eq!(combined.total_tokens(), 36);
        assert_eq!(combined.cycle_durations().len(), 4);
    }

    #[tokio::test]
    async fn try_answer_keeps_usage_of_failed_call() {
        let backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("t1", "always_x", json!({}))],
                TokenUsage::new(8, 2),
            )),
            Err(BackendError::network("connection reset")),
        ]);
        let failure = agent("analyst", x_tool_config(), backend)
            .try_answer("q")
            .await
            .unwrap_err();

        assert!(matches!(failure.error, AgentError::BackendUnavailable(_)));
        assert_eq!(failure.metrics.total_tokens(), 10);
        assert_eq!(failure.metrics.call_count("always_x"), 1);
        assert_eq!(failure.metrics.cycle_durations().len(), 2);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_specialist() {
        let config = AgentConfig::builder("prompt")
            .tool(
                ToolSpec::new(
                    "needs_ticker",
                    "d",
                    InputSchema::new().with_param(ParamSpec::required("ticker", ParamKind::String, "t")),
                )
                .unwrap(),
                handler_fn(|_| panic!("must not be called")),
            )
            .build()
            .unwrap();
        let backend = QueueBackend::new(vec![
            Ok(BackendResponse::tool_calls(
                vec![call("t1", "needs_ticker", json!({"ticker": 5}))],
                TokenUsage::zero(),
            )),
            Ok(BackendResponse::final_text("ok", TokenUsage::zero())),
        ]);

        let response = agent("a", config, backend.clone()).answer("q").await.unwrap();
        assert_eq!(response.metrics.tool_metrics()["needs_ticker"].error_count, 1);
        let requests = backend.requests.lock().unwrap();
        let result = requests[1].messages[2].tool_results_iter().next().unwrap();
        assert!(result.text().contains("invalid input"));
    }
}
