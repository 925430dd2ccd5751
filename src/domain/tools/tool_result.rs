//! Tool result - the outcome of one invocation, fed back to the backend.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ToolUseId;
use crate::domain::metrics::DelegationReport;

/// Whether the tool produced a value or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// One block of tool output. Serializes as `{"text": ...}` or `{"json": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBlock {
    Text(String),
    Json(serde_json::Value),
}

impl ContentBlock {
    /// Text rendering of the block.
    pub fn to_text(&self) -> String {
        match self {
            ContentBlock::Text(text) => text.clone(),
            ContentBlock::Json(value) => value.to_string(),
        }
    }
}

/// Outcome of a tool invocation.
///
/// Carries the `tool_use_id` of the invocation that produced it. When the
/// tool delegated to another agent, the delegated call's metrics ride along
/// for the caller's bookkeeping; they are never sent to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    tool_use_id: ToolUseId,
    status: ToolStatus,
    content: Vec<ContentBlock>,
    #[serde(skip)]
    delegation: Option<DelegationReport>,
}

impl ToolResult {
    /// Creates a successful result.
    pub fn success(tool_use_id: ToolUseId, content: Vec<ContentBlock>) -> Self {
        Self {
            tool_use_id,
            status: ToolStatus::Success,
            content,
            delegation: None,
        }
    }

    /// Creates an error result with a single text block.
    pub fn error(tool_use_id: ToolUseId, message: impl Into<String>) -> Self {
        Self {
            tool_use_id,
            status: ToolStatus::Error,
            content: vec![ContentBlock::Text(message.into())],
            delegation: None,
        }
    }

    /// Attaches the metrics of a delegated agent call.
    pub fn with_delegation(mut self, delegation: Option<DelegationReport>) -> Self {
        self.delegation = delegation;
        self
    }

    pub fn tool_use_id(&self) -> &ToolUseId {
        &self.tool_use_id
    }

    pub fn status(&self) -> ToolStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn delegation(&self) -> Option<&DelegationReport> {
        self.delegation.as_ref()
    }

    /// Takes the delegation report, leaving `None`.
    pub fn take_delegation(&mut self) -> Option<DelegationReport> {
        self.delegation.take()
    }

    /// All content blocks rendered as text, one per line.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::to_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
