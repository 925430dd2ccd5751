//! Agent configuration.
//!
//! An [`AgentConfig`] is immutable once built and can be shared by any number
//! of concurrent `answer()` calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{ToolHandler, ToolRegistry, ToolSpec};

use super::AgentError;

/// Default number of reasoning cycles before an answer is abandoned.
pub const DEFAULT_MAX_CYCLES: u32 = 16;

/// Model identifier and sampling configuration sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub model_id: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Overrides the backend's default endpoint.
    pub endpoint: Option<String>,
    /// Service region, for backends addressed per region.
    pub region: Option<String>,
    /// Bound on a single backend request.
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Creates a configuration with default sampling.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: 0.1,
            top_p: 0.5,
            max_tokens: 2048,
            endpoint: None,
            region: None,
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks sampling ranges and the timeout.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model_id.trim().is_empty() {
            return Err(ValidationError::empty_field("model_id"));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                "temperature",
                0.0,
                1.0,
                self.temperature as f64,
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ValidationError::out_of_range("top_p", 0.0, 1.0, self.top_p as f64));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::out_of_range(
                "max_tokens",
                1.0,
                u32::MAX as f64,
                0.0,
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ValidationError::invalid_format(
                "request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// How the invocations of one cycle are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolExecution {
    /// All invocations run at once; results are rejoined in request order.
    #[default]
    Concurrent,
    /// Invocations run one after another in request order.
    Sequential,
}

/// Immutable agent configuration: role prompt, tools and backend settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    system_prompt: String,
    description: String,
    registry: ToolRegistry,
    backend: BackendConfig,
    max_cycles: u32,
    tool_execution: ToolExecution,
}

impl AgentConfig {
    /// Starts building a configuration around a system prompt.
    pub fn builder(system_prompt: impl Into<String>) -> AgentConfigBuilder {
        AgentConfigBuilder::new(system_prompt)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// One-line summary, used when the agent is offered as a tool.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    pub fn tool_execution(&self) -> ToolExecution {
        self.tool_execution
    }
}

/// Builder for [`AgentConfig`].
///
/// Tool registration errors are reported by [`AgentConfigBuilder::build`].
pub struct AgentConfigBuilder {
    system_prompt: String,
    description: Option<String>,
    registry: ToolRegistry,
    pending: Vec<(ToolSpec, Arc<dyn ToolHandler>)>,
    backend: BackendConfig,
    max_cycles: u32,
    tool_execution: ToolExecution,
}

impl AgentConfigBuilder {
    fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            description: None,
            registry: ToolRegistry::new(),
            pending: Vec::new(),
            backend: BackendConfig::new("default"),
            max_cycles: DEFAULT_MAX_CYCLES,
            tool_execution: ToolExecution::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds one tool.
    pub fn tool(mut self, spec: ToolSpec, handler: Arc<dyn ToolHandler>) -> Self {
        self.pending.push((spec, handler));
        self
    }

    /// Starts from an existing registry. Tools added with
    /// [`AgentConfigBuilder::tool`] are registered after it.
    pub fn registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn max_cycles(mut self, max_cycles: u32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn tool_execution(mut self, tool_execution: ToolExecution) -> Self {
        self.tool_execution = tool_execution;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ValidationError::empty_field("system_prompt").into());
        }
        if self.max_cycles == 0 {
            return Err(AgentError::configuration("max_cycles must be at least 1"));
        }
        self.backend.validate()?;

        let mut registry = self.registry;
        for (spec, handler) in self.pending {
            registry.register(spec, handler)?;
        }

        Ok(AgentConfig {
            system_prompt: self.system_prompt,
            description: self
                .description
                .unwrap_or_else(|| "Process queries using specialized agent.".to_string()),
            registry,
            backend: self.backend,
            max_cycles: self.max_cycles,
            tool_execution: self.tool_execution,
        })
    }
}
