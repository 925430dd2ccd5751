//! Ollama health check - server and model availability via `/api/tags`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::ports::{HealthReport, ModelHealthCheck};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Why the model list could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("Cannot connect to Ollama server. Is Ollama running?")]
    Connect,

    #[error("Connection to Ollama server timed out")]
    Timeout,

    #[error("Ollama server responded with status {0}")]
    Status(u16),

    #[error("Unexpected error connecting to Ollama: {0}")]
    Unexpected(String),
}

/// Availability checks against a local Ollama server.
pub struct OllamaHealthCheck {
    host: String,
    client: Client,
}

impl OllamaHealthCheck {
    /// Checker with the default five second timeout.
    pub fn new(host: impl Into<String>) -> Result<Self, HealthError> {
        Self::with_timeout(host, Duration::from_secs(5))
    }

    pub fn with_timeout(host: impl Into<String>, timeout: Duration) -> Result<Self, HealthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HealthError::Unexpected(e.to_string()))?;
        Ok(Self {
            host: host.into(),
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn fetch_tags(&self) -> Result<TagsResponse, HealthError> {
        let url = format!("{}/api/tags", self.host.trim_end_matches('/'));
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HealthError::Timeout
            } else if e.is_connect() {
                HealthError::Connect
            } else {
                HealthError::Unexpected(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HealthError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| HealthError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl ModelHealthCheck for OllamaHealthCheck {
    async fn check_server(&self) -> HealthReport {
        match self.fetch_tags().await {
            Ok(_) => HealthReport::available(""),
            Err(err) => {
                tracing::warn!(host = %self.host, error = %err, "Ollama server check failed");
                HealthReport::unavailable(err.to_string())
            }
        }
    }

    async fn check_model(&self, model: &str) -> HealthReport {
        let tags = match self.fetch_tags().await {
            Ok(tags) => tags,
            Err(HealthError::Status(status)) => {
                return HealthReport::unavailable(format!(
                    "Cannot retrieve model list from Ollama (status {})",
                    status
                ))
            }
            Err(err) => {
                return HealthReport::unavailable(format!("Error checking model availability: {}", err))
            }
        };

        let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
        if names.contains(&model) {
            return HealthReport::available("");
        }
        let available = if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        };
        HealthReport::unavailable(format!(
            "Model '{}' not found. Available models: {}",
            model, available
        ))
    }
}

/// Steps that get a local model running.
pub fn remediation_steps(model: &str) -> Vec<String> {
    vec![
        "Install Ollama from https://ollama.ai/".to_string(),
        "Start Ollama: ollama serve".to_string(),
        format!("Pull the required model: ollama pull {}", model),
    ]
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}
