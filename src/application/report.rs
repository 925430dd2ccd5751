//! Plain-text rendering of answers and their metrics.

use std::fmt::Write;

use crate::domain::agent::AgentResponse;
use crate::domain::metrics::{DelegationReport, InvocationMetrics};

use super::Specialist;

/// Horizontal rule between analyses.
pub fn separator() -> String {
    "=".repeat(50)
}

/// Total tokens, execution time and tools used, one per line.
pub fn render_metrics(metrics: &InvocationMetrics) -> String {
    format!(
        "Total tokens: {}\nExecution time: {:.2} seconds\nTools used: {:?}",
        metrics.total_tokens(),
        metrics.total_duration().as_secs_f64(),
        metrics.tools_used(),
    )
}

/// Heading for a delegated call, e.g. "=== Risk Analysis Metrics ===".
pub fn delegation_heading(report: &DelegationReport) -> String {
    let title = match Specialist::from_agent_name(&report.agent) {
        Some(specialist) => title_words(specialist.label()),
        None => report.agent.clone(),
    };
    format!("=== {} Metrics ===", title)
}

fn title_words(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// The answer, the answering agent's own metrics, then one section per
/// delegated call.
pub fn render_analysis(ticker: &str, response: &AgentResponse) -> String {
    let mut out = String::new();
    for delegation in &response.delegations {
        let _ = writeln!(out, "{}", delegation_heading(delegation));
        let _ = writeln!(out, "{}\n", render_metrics(&delegation.metrics));
    }
    let _ = writeln!(out, "Analysis for {}:\n {}", ticker, response.text);
    let _ = write!(out, "{}", render_metrics(&response.metrics));
    if !response.delegations.is_empty() {
        let _ = write!(
            out,
            "\n\n=== Combined Metrics ===\n{}",
            render_metrics(&response.combined_metrics())
        );
    }
    out
}
