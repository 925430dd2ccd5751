//! Agent loop limits

use serde::Deserialize;

use crate::domain::agent::{ToolExecution, DEFAULT_MAX_CYCLES};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Reasoning cycles allowed per answer
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    /// How the invocations of one cycle are run
    #[serde(default)]
    pub tool_execution: ToolExecution,
}

impl AgentSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_cycles == 0 {
            return Err(ValidationError::InvalidMaxCycles);
        }
        Ok(())
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
            tool_execution: ToolExecution::default(),
        }
    }
}

fn default_max_cycles() -> u32 {
    DEFAULT_MAX_CYCLES
}
