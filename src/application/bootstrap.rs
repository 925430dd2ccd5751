//! Builds the ports selected by configuration.

use std::sync::Arc;

use crate::adapters::ai::{AnthropicBackend, AnthropicConfig, OllamaBackend, OllamaConfig, ScriptedBackend};
use crate::adapters::market_data::{FinancialDatasetsClient, FinancialDatasetsConfig, StaticMarketData};
use crate::config::{AppConfig, BackendProvider, ValidationError, ANTHROPIC_API_KEY_VAR};
use crate::ports::{MarketDataSource, ReasoningBackend};

use super::DeskError;

/// Creates the reasoning backend named by `backend.provider`.
///
/// The scripted backend runs in autopilot so that offline runs still call
/// every tool.
pub fn build_backend(config: &AppConfig) -> Result<Arc<dyn ReasoningBackend>, DeskError> {
    let backend: Arc<dyn ReasoningBackend> = match config.backend.provider {
        BackendProvider::Anthropic => {
            let api_key = config
                .anthropic
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .ok_or(ValidationError::MissingRequired(ANTHROPIC_API_KEY_VAR))?;
            let anthropic = AnthropicConfig::new(api_key)
                .with_model(config.anthropic.model.clone())
                .with_base_url(config.anthropic.base_url.clone())
                .with_region(config.anthropic.region.clone())
                .with_max_retries(config.anthropic.max_retries);
            Arc::new(AnthropicBackend::new(anthropic)?)
        }
        BackendProvider::Ollama => {
            let ollama = OllamaConfig::new(config.ollama.model.clone()).with_host(config.ollama.host.clone());
            Arc::new(OllamaBackend::new(ollama)?)
        }
        BackendProvider::Scripted => Arc::new(ScriptedBackend::autopilot()),
    };
    tracing::info!(
        provider = config.backend.provider.as_str(),
        model = %config.model_id(),
        "Reasoning backend ready"
    );
    Ok(backend)
}

/// Creates the snapshot source for the `market_data` tool.
pub fn build_market_source(config: &AppConfig) -> Result<Arc<dyn MarketDataSource>, DeskError> {
    let settings = &config.market_data;
    if !settings.live {
        return Ok(Arc::new(StaticMarketData::default()));
    }
    let mut client_config = FinancialDatasetsConfig::default()
        .with_base_url(settings.base_url.clone())
        .with_timeout(settings.timeout());
    if let Some(key) = settings.api_key.as_ref().filter(|key| !key.trim().is_empty()) {
        client_config = client_config.with_api_key(key.clone());
    }
    let client = FinancialDatasetsClient::new(client_config).map_err(|e| DeskError::MarketData(e.to_string()))?;
    Ok(Arc::new(client))
}

/// Forces the offline stack: scripted backend and static market data.
pub fn offline(mut config: AppConfig) -> AppConfig {
    config.backend.provider = BackendProvider::Scripted;
    config.market_data.live = false;
    config
}
