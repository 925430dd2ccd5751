//! Metrics Collector - token usage, cycle timing and tool statistics.

mod invocation_metrics;

pub use invocation_metrics::{
    DelegationReport, InvocationMetrics, TokenUsage, ToolMetric, INPUT_TOKENS, OUTPUT_TOKENS,
    TOTAL_TOKENS,
};
