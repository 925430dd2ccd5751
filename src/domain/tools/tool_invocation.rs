//! Tool invocation - a backend's request to call one tool.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ToolUseId;

/// A request to invoke a tool, as produced by a reasoning backend.
///
/// Consumed exactly once by the registry; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    tool_use_id: ToolUseId,
    tool_name: String,
    input: serde_json::Value,
}

impl ToolInvocation {
    /// Creates an invocation with a backend-assigned identifier.
    pub fn new(tool_use_id: ToolUseId, tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            tool_use_id,
            tool_name: tool_name.into(),
            input,
        }
    }

    /// Creates an invocation with a freshly generated identifier.
    pub fn generated(tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        Self::new(ToolUseId::generate(), tool_name, input)
    }

    pub fn tool_use_id(&self) -> &ToolUseId {
        &self.tool_use_id
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    /// Consumes self and returns its parts.
    pub fn into_parts(self) -> (ToolUseId, String, serde_json::Value) {
        (self.tool_use_id, self.tool_name, self.input)
    }
}
