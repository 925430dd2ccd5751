//! Local model server configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{check_url, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for availability probes, in seconds
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

impl OllamaSettings {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url(&self.host, "ollama")?;
        if self.health_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ollama health check"));
        }
        Ok(())
    }
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:8b-q8_0".to_string()
}

fn default_health_timeout() -> u64 {
    5
}
