//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Reasoning backends (Anthropic, Ollama, scripted)
//! - `market_data` - Price snapshot sources
//! - `health` - Local model availability checks

pub mod ai;
pub mod health;
pub mod market_data;

pub use ai::{AnthropicBackend, AnthropicConfig, OllamaBackend, OllamaConfig, ScriptedBackend, ScriptedTurn};
pub use health::{remediation_steps, HealthError, OllamaHealthCheck};
pub use market_data::{FinancialDatasetsClient, FinancialDatasetsConfig, StaticMarketData};
