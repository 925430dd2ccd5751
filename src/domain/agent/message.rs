//! Conversation messages exchanged with a backend.

use serde::{Deserialize, Serialize};

use crate::domain::tools::{ToolInvocation, ToolResult};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContent {
    Text(String),
    ToolUse(ToolInvocation),
    ToolResult(ToolResult),
}

/// A conversation turn.
///
/// Tool invocations appear in assistant messages; their results come back in
/// the following user message, in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// A user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![MessageContent::Text(text.into())],
        }
    }

    /// An assistant message with optional text followed by tool invocations.
    pub fn assistant(text: impl Into<String>, invocations: Vec<ToolInvocation>) -> Self {
        let text = text.into();
        let mut content = Vec::with_capacity(invocations.len() + 1);
        if !text.is_empty() {
            content.push(MessageContent::Text(text));
        }
        content.extend(invocations.into_iter().map(MessageContent::ToolUse));
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user message returning tool results.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results.into_iter().map(MessageContent::ToolResult).collect(),
        }
    }

    /// Text parts joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool invocations in this message.
    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.content.iter().filter_map(|part| match part {
            MessageContent::ToolUse(invocation) => Some(invocation),
            _ => None,
        })
    }

    /// Tool results in this message.
    pub fn tool_results_iter(&self) -> impl Iterator<Item = &ToolResult> {
        self.content.iter().filter_map(|part| match part {
            MessageContent::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ToolUseId;
    use serde_json::json;

    #[test]
    fn assistant_message_skips_empty_text() {
        let invocation = ToolInvocation::generated("market_data", json!({"ticker": "AAPL"}));
        let message = Message::assistant("", vec![invocation]);

        assert_eq!(message.content.len(), 1);
        assert_eq!(message.tool_uses().count(), 1);
        assert_eq!(message.text(), "");
    }

    #[test]
    fn tool_results_message_is_user_role() {
        let result = ToolResult::error(ToolUseId::new("t1").unwrap(), "nope");
        let message = Message::tool_results(vec![result]);

        assert_eq!(message.role, Role::User);
        assert_eq!(message.tool_results_iter().count(), 1);
    }

    #[test]
    fn user_message_has_text() {
        assert_eq!(Message::user("hello").text(), "hello");
    }
}
