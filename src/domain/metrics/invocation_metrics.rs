//! Per-call usage accumulator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Usage key for prompt tokens.
pub const INPUT_TOKENS: &str = "inputTokens";
/// Usage key for generated tokens.
pub const OUTPUT_TOKENS: &str = "outputTokens";
/// Usage key for the sum of both.
pub const TOTAL_TOKENS: &str = "totalTokens";

/// Token usage reported by a single backend response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Creates usage with the total derived from input and output.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }

    /// Creates zero usage.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Call statistics for one tool name within one agent call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetric {
    pub call_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub total_time: Duration,
}

impl ToolMetric {
    fn absorb(&mut self, other: &ToolMetric) {
        self.call_count += other.call_count;
        self.success_count += other.success_count;
        self.error_count += other.error_count;
        self.total_time += other.total_time;
    }
}

/// Usage accumulated over one top-level `answer()` call.
///
/// Created fresh for every call and owned exclusively by it. Token usage is
/// keyed by category (`inputTokens`, `outputTokens`, `totalTokens`), cycle
/// durations are kept in cycle order, and tool metrics are keyed by tool name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationMetrics {
    accumulated_usage: BTreeMap<String, u64>,
    cycle_durations: Vec<Duration>,
    tool_metrics: BTreeMap<String, ToolMetric>,
}

impl InvocationMetrics {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one backend response's usage.
    pub fn add_usage(&mut self, usage: TokenUsage) {
        *self.accumulated_usage.entry(INPUT_TOKENS.to_string()).or_default() += usage.input_tokens;
        *self.accumulated_usage.entry(OUTPUT_TOKENS.to_string()).or_default() += usage.output_tokens;
        *self.accumulated_usage.entry(TOTAL_TOKENS.to_string()).or_default() += usage.total_tokens;
    }

    /// Appends the wall time of a completed cycle.
    pub fn record_cycle(&mut self, elapsed: Duration) {
        self.cycle_durations.push(elapsed);
    }

    /// Records one dispatched invocation of `tool`.
    pub fn record_tool(&mut self, tool: &str, succeeded: bool, elapsed: Duration) {
        let metric = self.tool_metrics.entry(tool.to_string()).or_default();
        metric.call_count += 1;
        if succeeded {
            metric.success_count += 1;
        } else {
            metric.error_count += 1;
        }
        metric.total_time += elapsed;
    }

    /// Token usage by category.
    pub fn accumulated_usage(&self) -> &BTreeMap<String, u64> {
        &self.accumulated_usage
    }

    /// Per-cycle wall times in cycle order.
    pub fn cycle_durations(&self) -> &[Duration] {
        &self.cycle_durations
    }

    /// Per-tool statistics keyed by tool name.
    pub fn tool_metrics(&self) -> &BTreeMap<String, ToolMetric> {
        &self.tool_metrics
    }

    /// Number of dispatches recorded for `tool`.
    pub fn call_count(&self, tool: &str) -> u64 {
        self.tool_metrics.get(tool).map_or(0, |m| m.call_count)
    }

    /// Usage for one category, zero when absent.
    pub fn usage(&self, key: &str) -> u64 {
        self.accumulated_usage.get(key).copied().unwrap_or(0)
    }

    pub fn total_tokens(&self) -> u64 {
        self.usage(TOTAL_TOKENS)
    }

    /// Sum of all cycle durations.
    pub fn total_duration(&self) -> Duration {
        self.cycle_durations.iter().sum()
    }

    /// Names of the tools invoked, sorted.
    pub fn tools_used(&self) -> Vec<&str> {
        self.tool_metrics.keys().map(String::as_str).collect()
    }

    /// Combines two accumulators.
    ///
    /// Token usage and tool metrics are summed by key; cycle durations of `b`
    /// follow those of `a`.
    pub fn merge(a: &InvocationMetrics, b: &InvocationMetrics) -> InvocationMetrics {
        let mut merged = a.clone();
        merged.absorb(b);
        merged
    }

    /// In-place form of [`InvocationMetrics::merge`].
    pub fn absorb(&mut self, other: &InvocationMetrics) {
        for (key, count) in &other.accumulated_usage {
            *self.accumulated_usage.entry(key.clone()).or_default() += count;
        }
        self.cycle_durations.extend_from_slice(&other.cycle_durations);
        for (name, metric) in &other.tool_metrics {
            self.tool_metrics.entry(name.clone()).or_default().absorb(metric);
        }
    }
}

/// Metrics of one delegated agent call, as seen by the delegating agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationReport {
    /// Name of the agent that was called.
    pub agent: String,
    /// Everything that agent consumed, including its own delegations.
    pub metrics: InvocationMetrics,
}

impl DelegationReport {
    pub fn new(agent: impl Into<String>, metrics: InvocationMetrics) -> Self {
        Self {
            agent: agent.into(),
            metrics,
        }
    }
}
