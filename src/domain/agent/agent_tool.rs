//! Agents as tools, and coordinators built from them.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::foundation::{AgentId, ValidationError};
use crate::domain::metrics::DelegationReport;
use crate::domain::tools::{
    str_param, InputSchema, ParamKind, ParamSpec, ToolFailure, ToolHandler, ToolOutput, ToolSpec,
};
use crate::ports::ReasoningBackend;

use super::{Agent, AgentConfigBuilder, AgentError, BackendConfig, ToolExecution};

/// Synthetic tool through which a coordinator reaches another agent.
///
/// Takes `{"query": string}`, answers it with the wrapped agent and returns
/// the answer text. The delegated call's metrics travel with the output,
/// also when the call fails. A failing agent call is reported as a tool
/// failure reading `"<label> error: <message>"`.
#[derive(Debug, Clone)]
pub struct AgentTool {
    agent: Arc<Agent>,
    error_label: String,
}

impl AgentTool {
    pub fn new(agent: Arc<Agent>) -> Self {
        let error_label = agent.id().to_string();
        Self { agent, error_label }
    }

    /// Sets the prefix of failure messages (e.g. "Fundamental analysis").
    pub fn with_error_label(mut self, label: impl Into<String>) -> Self {
        self.error_label = label.into();
        self
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Tool spec named after the agent, described by its configuration.
    pub fn spec(&self) -> Result<ToolSpec, ValidationError> {
        ToolSpec::new(
            self.agent.id().as_str(),
            self.agent.config().description(),
            InputSchema::new().with_param(ParamSpec::required(
                "query",
                ParamKind::String,
                "The question to hand to this specialist",
            )),
        )
    }
}

#[async_trait]
impl ToolHandler for AgentTool {
    async fn call(&self, input: Value) -> Result<ToolOutput, ToolFailure> {
        let query = str_param(&input, "query")?;
        tracing::debug!(agent = %self.agent.id(), "Delegating query");

        match self.agent.try_answer(query).await {
            Ok(response) => {
                let report = DelegationReport::new(self.agent.id().as_str(), response.combined_metrics());
                Ok(ToolOutput::text(response.text).with_delegation(report))
            }
            Err(failure) => {
                let report = DelegationReport::new(self.agent.id().as_str(), failure.combined_metrics());
                Err(ToolFailure::new(format!("{} error: {}", self.error_label, failure.error))
                    .with_delegation(report))
            }
        }
    }
}

/// Builds an agent whose tools include other agents.
///
/// ```ignore
/// let coordinator = CoordinatorBuilder::new(id, TRADING_COORDINATOR_PROMPT)
///     .specialist(AgentTool::new(fundamental).with_error_label("Fundamental analysis"))
///     .specialist(AgentTool::new(risk).with_error_label("Risk analysis"))
///     .build(backend)?;
/// ```
pub struct CoordinatorBuilder {
    id: AgentId,
    config: AgentConfigBuilder,
    specialists: Vec<AgentTool>,
}

impl CoordinatorBuilder {
    pub fn new(id: AgentId, system_prompt: impl Into<String>) -> Self {
        Self {
            id,
            config: super::AgentConfig::builder(system_prompt),
            specialists: Vec::new(),
        }
    }

    /// Adds a specialist reachable as a tool named after it.
    pub fn specialist(mut self, tool: AgentTool) -> Self {
        self.specialists.push(tool);
        self
    }

    /// Adjusts the coordinator's own configuration (extra tools, description).
    pub fn configure(mut self, f: impl FnOnce(AgentConfigBuilder) -> AgentConfigBuilder) -> Self {
        self.config = f(self.config);
        self
    }

    pub fn backend_config(mut self, backend: BackendConfig) -> Self {
        self.config = self.config.backend(backend);
        self
    }

    pub fn max_cycles(mut self, max_cycles: u32) -> Self {
        self.config = self.config.max_cycles(max_cycles);
        self
    }

    pub fn tool_execution(mut self, tool_execution: ToolExecution) -> Self {
        self.config = self.config.tool_execution(tool_execution);
        self
    }

    /// Builds the coordinator.
    ///
    /// Fails if a specialist shares the coordinator's name or another
    /// specialist's name.
    pub fn build(self, backend: Arc<dyn ReasoningBackend>) -> Result<Agent, AgentError> {
        let mut config = self.config;
        for tool in self.specialists {
            if tool.agent().id() == &self.id {
                return Err(AgentError::configuration(format!(
                    "agent '{}' cannot delegate to itself",
                    self.id
                )));
            }
            let spec = tool.spec()?;
            config = config.tool(spec, Arc::new(tool));
        }
        Ok(Agent::new(self.id, config.build()?, backend))
    }
}
