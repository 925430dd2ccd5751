//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates, with the `MARKET_ANALYST` prefix and `__` separating
//! nested values. Every section has defaults, so an empty environment loads.
//!
//! # Example
//!
//! ```no_run
//! use market_analyst::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Reasoning backend: {}", config.backend.provider.as_str());
//! ```

mod agent;
mod anthropic;
mod backend;
mod error;
mod logging;
mod market_data;
mod ollama;

pub use agent::AgentSettings;
pub use anthropic::AnthropicSettings;
pub use backend::{BackendProvider, BackendSettings};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingSettings;
pub use market_data::MarketDataSettings;
pub use ollama::OllamaSettings;

use serde::Deserialize;

use crate::domain::agent::BackendConfig;

/// Environment variable holding the remote backend's API key.
pub const ANTHROPIC_API_KEY_VAR: &str = "MARKET_ANALYST__ANTHROPIC__API_KEY";

/// Model name reported for the offline backend.
pub const SCRIPTED_MODEL: &str = "scripted";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend selection and sampling parameters
    #[serde(default)]
    pub backend: BackendSettings,

    /// Remote Messages API
    #[serde(default)]
    pub anthropic: AnthropicSettings,

    /// Local Ollama server
    #[serde(default)]
    pub ollama: OllamaSettings,

    /// Price snapshot source for the market data tool
    #[serde(default)]
    pub market_data: MarketDataSettings,

    /// Reasoning loop limits
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Command-line values applied over the loaded configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub provider: Option<BackendProvider>,
    pub ollama_host: Option<String>,
    pub region: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables with the `MARKET_ANALYST`
    /// prefix, using `__` (double underscore) to separate nested values:
    ///
    /// - `MARKET_ANALYST__BACKEND__PROVIDER=ollama` -> `backend.provider = ollama`
    /// - `MARKET_ANALYST__ANTHROPIC__API_KEY=...` -> `anthropic.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MARKET_ANALYST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The API key is only required when the remote backend is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.backend.validate()?;
        self.anthropic.validate()?;
        self.ollama.validate()?;
        self.market_data.validate()?;
        self.agent.validate()?;
        self.logging.validate()?;

        if self.backend.provider == BackendProvider::Anthropic && !self.anthropic.has_api_key() {
            return Err(ValidationError::MissingRequired(ANTHROPIC_API_KEY_VAR));
        }
        Ok(())
    }

    /// Applies command-line overrides; absent values leave the config unchanged.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(provider) = overrides.provider {
            self.backend.provider = provider;
        }
        if let Some(host) = overrides.ollama_host {
            self.ollama.host = host;
        }
        if let Some(region) = overrides.region {
            self.anthropic.region = region;
        }
    }

    /// Model used by the selected provider, after the backend-level override.
    pub fn model_id(&self) -> String {
        if let Some(model) = self.backend.model.as_ref().filter(|m| !m.trim().is_empty()) {
            return model.clone();
        }
        match self.backend.provider {
            BackendProvider::Anthropic => self.anthropic.model.clone(),
            BackendProvider::Ollama => self.ollama.model.clone(),
            BackendProvider::Scripted => SCRIPTED_MODEL.to_string(),
        }
    }

    /// Per-request backend configuration handed to every agent.
    pub fn backend_config(&self) -> BackendConfig {
        let config = BackendConfig::new(self.model_id())
            .with_temperature(self.backend.temperature)
            .with_top_p(self.backend.top_p)
            .with_max_tokens(self.backend.max_tokens)
            .with_request_timeout(self.backend.timeout());
        match self.backend.provider {
            BackendProvider::Anthropic => config.with_region(self.anthropic.region.clone()),
            _ => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::ToolExecution;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MARKET_ANALYST__BACKEND__PROVIDER",
        "MARKET_ANALYST__BACKEND__MODEL",
        "MARKET_ANALYST__BACKEND__TEMPERATURE",
        "MARKET_ANALYST__ANTHROPIC__API_KEY",
        "MARKET_ANALYST__ANTHROPIC__REGION",
        "MARKET_ANALYST__OLLAMA__HOST",
        "MARKET_ANALYST__MARKET_DATA__LIVE",
        "MARKET_ANALYST__AGENT__MAX_CYCLES",
        "MARKET_ANALYST__AGENT__TOOL_EXECUTION",
        "MARKET_ANALYST__LOGGING__JSON",
    ];

    fn set_minimal_env() {
        env::set_var("MARKET_ANALYST__ANTHROPIC__API_KEY", "sk-ant-xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.backend.provider, BackendProvider::Anthropic);
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.market_data.base_url, "https://api.financialdatasets.ai");
        assert_eq!(config.agent.max_cycles, 16);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_backend_requires_api_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired(
                "MARKET_ANALYST__ANTHROPIC__API_KEY"
            ))
        );
    }

    #[test]
    fn test_local_backend_needs_no_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("MARKET_ANALYST__BACKEND__PROVIDER", "ollama");
        env::set_var("MARKET_ANALYST__OLLAMA__HOST", "http://gpu-box:11434");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend.provider, BackendProvider::Ollama);
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.model_id(), "qwen3:8b-q8_0");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("MARKET_ANALYST__BACKEND__TEMPERATURE", "0.3");
        env::set_var("MARKET_ANALYST__AGENT__MAX_CYCLES", "4");
        env::set_var("MARKET_ANALYST__AGENT__TOOL_EXECUTION", "sequential");
        env::set_var("MARKET_ANALYST__MARKET_DATA__LIVE", "false");
        env::set_var("MARKET_ANALYST__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!((config.backend.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.agent.max_cycles, 4);
        assert_eq!(config.agent.tool_execution, ToolExecution::Sequential);
        assert!(!config.market_data.live);
        assert!(config.logging.json);
    }

    #[test]
    fn test_backend_config_carries_settings() {
        let mut config = AppConfig::default();
        config.backend.model = Some("claude-custom".to_string());
        config.backend.timeout_secs = 30;
        config.anthropic.region = "eu-central-1".to_string();

        let backend = config.backend_config();
        assert_eq!(backend.model_id, "claude-custom");
        assert_eq!(backend.region.as_deref(), Some("eu-central-1"));
        assert_eq!(backend.request_timeout, Duration::from_secs(30));
        assert!(backend.validate().is_ok());
    }

    #[test]
    fn test_command_line_overrides() {
        let mut config = AppConfig::default();
        config.apply(Overrides {
            provider: Some(BackendProvider::Ollama),
            ollama_host: Some("http://gpu-box:11434".to_string()),
            region: Some("eu-central-1".to_string()),
        });

        assert_eq!(config.backend.provider, BackendProvider::Ollama);
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.anthropic.region, "eu-central-1");

        config.apply(Overrides::default());
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scripted_backend_has_placeholder_model() {
        let mut config = AppConfig::default();
        config.backend.provider = BackendProvider::Scripted;
        assert_eq!(config.model_id(), SCRIPTED_MODEL);
        assert!(config.validate().is_ok());
    }
}
