//! Tools - the invocation contract between agents and callable tools.
//!
//! ## Key Types
//!
//! - [`ToolSpec`] - Name, description and [`InputSchema`] of a tool
//! - [`ToolInvocation`] - A backend's request to call a tool
//! - [`ToolResult`] - Outcome of an invocation, correlated by `tool_use_id`
//! - [`ToolHandler`] - Implementation of a tool
//! - [`ToolRegistry`] - Name to implementation mapping with validated dispatch

mod handler;
mod input_schema;
mod tool_invocation;
mod tool_registry;
mod tool_result;
mod tool_spec;

pub use handler::{async_handler_fn, handler_fn, str_param, ToolFailure, ToolHandler, ToolOutput};
pub use input_schema::{InputSchema, ParamKind, ParamSpec, SchemaViolation};
pub use tool_invocation::ToolInvocation;
pub use tool_registry::{RegistryError, ToolRegistry};
pub use tool_result::{ContentBlock, ToolResult, ToolStatus};
pub use tool_spec::ToolSpec;
