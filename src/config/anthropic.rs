//! Remote backend configuration

use serde::Deserialize;

use super::error::{check_url, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicSettings {
    /// API key, required when the remote backend is selected
    pub api_key: Option<String>,

    /// May contain a `{region}` placeholder
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Retries on transient failures
    #[serde(default)]
    pub max_retries: u32,
}

impl AnthropicSettings {
    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Checks the shape of the settings; key presence is checked by the caller
    /// since it only matters when this backend is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url(&self.base_url, "anthropic")
    }
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            region: default_region(),
            model: default_model(),
            max_retries: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
