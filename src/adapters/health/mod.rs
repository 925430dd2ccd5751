//! Model Health Adapters.

mod ollama_health;

pub use ollama_health::{remediation_steps, HealthError, OllamaHealthCheck, DEFAULT_OLLAMA_HOST};
