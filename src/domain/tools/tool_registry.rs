//! Tool Registry - name to implementation mapping with schema-checked dispatch.
//!
//! # Example
//!
//! ```
//! use market_analyst::domain::tools::{
//!     handler_fn, InputSchema, ToolOutput, ToolRegistry, ToolSpec,
//! };
//!
//! let mut registry = ToolRegistry::new();
//! let spec = ToolSpec::new("echo", "Echo the input", InputSchema::new()).unwrap();
//! registry
//!     .register(spec, handler_fn(|input| Ok(ToolOutput::json(input))))
//!     .unwrap();
//!
//! assert!(registry.has_tool("echo"));
//! ```

use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::domain::foundation::ValidationError;

use super::{SchemaViolation, ToolHandler, ToolInvocation, ToolResult, ToolSpec};

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateToolName(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid input for tool '{tool}': {violation}")]
    InvalidInput {
        tool: String,
        violation: SchemaViolation,
    },

    #[error("invalid tool specification: {0}")]
    InvalidSpec(#[from] ValidationError),
}

impl RegistryError {
    /// Creates an invalid input error.
    pub fn invalid_input(tool: impl Into<String>, violation: SchemaViolation) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            violation,
        }
    }
}

struct RegisteredTool {
    spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

/// Tools available to one agent.
///
/// Specs are reported in registration order. Cloning is cheap; handlers are
/// shared.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<RegisteredTool>>,
    order: Vec<String>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// Fails with `DuplicateToolName` if the name is taken, leaving the
    /// registry unchanged.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        let name = spec.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateToolName(name));
        }
        self.tools
            .insert(name.clone(), Arc::new(RegisteredTool { spec, handler }));
        self.order.push(name);
        Ok(())
    }

    /// Builder form of [`ToolRegistry::register`].
    pub fn with_tool(
        mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<Self, RegistryError> {
        self.register(spec, handler)?;
        Ok(self)
    }

    /// Specs in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec.clone())
            .collect()
    }

    pub fn get_spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|tool| &tool.spec)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn tool_names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Runs one invocation.
    ///
    /// The input is validated before the implementation runs and defaults are
    /// applied. Implementation failures, including panics, become error
    /// results carrying the invocation's `tool_use_id`.
    pub async fn dispatch(&self, invocation: ToolInvocation) -> Result<ToolResult, RegistryError> {
        let tool = self
            .tools
            .get(invocation.tool_name())
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTool(invocation.tool_name().to_string()))?;

        tool.spec
            .input_schema()
            .validate(invocation.input())
            .map_err(|violation| RegistryError::invalid_input(invocation.tool_name(), violation))?;

        let (tool_use_id, name, input) = invocation.into_parts();
        let input = tool.spec.input_schema().apply_defaults(input);

        tracing::debug!(tool = %name, tool_use_id = %tool_use_id, "Dispatching tool");
        let started = Instant::now();
        let outcome = AssertUnwindSafe(tool.handler.call(input)).catch_unwind().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(output)) => {
                let (content, delegation) = output.into_parts();
                tracing::debug!(tool = %name, tool_use_id = %tool_use_id, elapsed_ms, "Tool succeeded");
                ToolResult::success(tool_use_id, content).with_delegation(delegation)
            }
            Ok(Err(failure)) => {
                tracing::warn!(tool = %name, tool_use_id = %tool_use_id, error = %failure, "Tool failed");
                let (message, delegation) = failure.into_parts();
                ToolResult::error(tool_use_id, message).with_delegation(delegation)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %name, tool_use_id = %tool_use_id, panic = %message, "Tool panicked");
                ToolResult::error(tool_use_id, format!("tool '{}' panicked: {}", name, message))
            }
        };
        Ok(result)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
