//! Domain layer containing the agent model and the market analysis tools.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, validation errors)
//! - `tools` - Tool specs, input schemas, handlers and the tool registry
//! - `metrics` - Token usage, cycle timings and per-tool counters
//! - `agent` - The reasoning loop, agents as tools and the capability graph
//! - `market` - Analysis tools, mock data generators and prompts

pub mod agent;
pub mod foundation;
pub mod market;
pub mod metrics;
pub mod tools;
