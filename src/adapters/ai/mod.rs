//! Reasoning Backend Adapters.
//!
//! Implementations of the ReasoningBackend port.
//!
//! ## Available Adapters
//!
//! - `AnthropicBackend` - Anthropic Messages API with tool use
//! - `OllamaBackend` - Local Ollama server (`/api/chat`)
//! - `ScriptedBackend` - Configurable in-process backend for tests and offline runs

mod anthropic_backend;
mod ollama_backend;
mod scripted_backend;

pub use anthropic_backend::{AnthropicBackend, AnthropicConfig};
pub use ollama_backend::{OllamaBackend, OllamaConfig};
pub use scripted_backend::{extract_ticker, ScriptedBackend, ScriptedTurn};
