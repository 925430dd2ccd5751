//! Agent module - specialists, coordinators and the reasoning loop.
//!
//! "Specialist" and "coordinator" are roles, not types: a coordinator is an
//! [`Agent`] whose registry holds [`AgentTool`]s wrapping other agents.
//! Delegation forms a directed acyclic capability graph; [`AgentGraph`]
//! rejects cycles at construction.

mod agent_loop;
mod agent_tool;
mod config;
mod errors;
mod graph;
mod message;

pub use agent_loop::{Agent, AgentResponse, AnswerFailure};
pub use agent_tool::{AgentTool, CoordinatorBuilder};
pub use config::{AgentConfig, AgentConfigBuilder, BackendConfig, ToolExecution, DEFAULT_MAX_CYCLES};
pub use errors::{AgentError, GraphError};
pub use graph::{AgentGraph, AgentSet};
pub use message::{Message, MessageContent, Role};

pub use crate::domain::metrics::DelegationReport;
