//! Tool specification - name, description and input schema.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::InputSchema;

/// Definition of a tool an agent's backend may invoke.
///
/// Immutable after construction. Names follow the rules shared by the
/// supported backends: 1 to 64 ASCII letters, digits, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    name: String,
    description: String,
    input_schema: InputSchema,
}

impl ToolSpec {
    /// Creates a validated tool specification.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::empty_field("tool_name"));
        }
        if name.len() > 64 {
            return Err(ValidationError::invalid_format(
                "tool_name",
                format!("'{}' is longer than 64 characters", name),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::invalid_format(
                "tool_name",
                format!("'{}' may only contain letters, digits, '_' and '-'", name),
            ));
        }
        Ok(Self {
            name,
            description: description.into(),
            input_schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    /// Converts to Anthropic tool format.
    pub fn to_anthropic_format(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema.to_json_schema()
        })
    }

    /// Converts to the function-calling format used by Ollama.
    pub fn to_function_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema.to_json_schema()
            }
        })
    }
}
