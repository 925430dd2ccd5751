//! Reasoning backend selection and inference parameters

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which reasoning backend the agents talk to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Remote Messages API
    #[default]
    Anthropic,
    /// Local Ollama server
    Ollama,
    /// Offline scripted backend
    Scripted,
}

impl BackendProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendProvider::Anthropic => "anthropic",
            BackendProvider::Ollama => "ollama",
            BackendProvider::Scripted => "scripted",
        }
    }
}

/// Inference parameters shared by every agent
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub provider: BackendProvider,

    /// Overrides the provider's default model
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ValidationError::OutOfRange {
                field: "temperature",
                range: "[0, 1]",
                value: self.temperature,
            });
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ValidationError::OutOfRange {
                field: "top_p",
                range: "(0, 1]",
                value: self.top_p,
            });
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("backend"));
        }
        Ok(())
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            model: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    120
}
