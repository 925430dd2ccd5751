//! Tool implementations behind a uniform interface.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::metrics::DelegationReport;

use super::ContentBlock;

/// Value returned by a tool implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    content: Vec<ContentBlock>,
    delegation: Option<DelegationReport>,
}

impl ToolOutput {
    /// Output consisting of a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::blocks(vec![ContentBlock::Text(text.into())])
    }

    /// Output consisting of a single JSON block.
    pub fn json(value: Value) -> Self {
        Self::blocks(vec![ContentBlock::Json(value)])
    }

    pub fn blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            delegation: None,
        }
    }

    /// Attaches the metrics of an agent call made to produce this output.
    pub fn with_delegation(mut self, report: DelegationReport) -> Self {
        self.delegation = Some(report);
        self
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn into_parts(self) -> (Vec<ContentBlock>, Option<DelegationReport>) {
        (self.content, self.delegation)
    }
}

/// Failure reported by a tool implementation.
///
/// Becomes an error `ToolResult` whose text is the message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ToolFailure {
    message: String,
    delegation: Option<DelegationReport>,
}

impl ToolFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            delegation: None,
        }
    }

    /// Attaches the metrics of a failed agent call.
    pub fn with_delegation(mut self, report: DelegationReport) -> Self {
        self.delegation = Some(report);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_parts(self) -> (String, Option<DelegationReport>) {
        (self.message, self.delegation)
    }
}

/// Implementation of one tool.
///
/// Receives input that has already been validated against the tool's schema
/// and had its defaults applied.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: Value) -> Result<ToolOutput, ToolFailure>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(Value) -> Result<ToolOutput, ToolFailure> + Send + Sync + 'static,
{
    async fn call(&self, input: Value) -> Result<ToolOutput, ToolFailure> {
        (self.f)(input)
    }
}

/// Wraps a synchronous closure as a tool handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Value) -> Result<ToolOutput, ToolFailure> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}

struct AsyncFnHandler<F, Fut> {
    f: F,
    _future: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<F, Fut> ToolHandler for AsyncFnHandler<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput, ToolFailure>> + Send + 'static,
{
    async fn call(&self, input: Value) -> Result<ToolOutput, ToolFailure> {
        (self.f)(input).await
    }
}

/// Wraps an async closure as a tool handler.
pub fn async_handler_fn<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput, ToolFailure>> + Send + 'static,
{
    Arc::new(AsyncFnHandler {
        f,
        _future: PhantomData,
    })
}

/// Reads a string parameter from validated input.
pub fn str_param<'a>(input: &'a Value, name: &str) -> Result<&'a str, ToolFailure> {
    input
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolFailure::new(format!("parameter '{}' must be a string", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn handler_fn_calls_closure() {
        let handler = handler_fn(|input| Ok(ToolOutput::text(format!("got {}", input["ticker"]))));
        let output = handler.call(json!({"ticker": "AAPL"})).await.unwrap();
        assert_eq!(output.content(), &[ContentBlock::Text("got \"AAPL\"".into())]);
    }

    #[tokio::test]
    async fn async_handler_fn_awaits_future() {
        let handler = async_handler_fn(|_input| async { Err(ToolFailure::new("offline")) });
        let err = handler.call(json!({})).await.unwrap_err();
        assert_eq!(err.message(), "offline");
    }

    #[test]
    fn str_param_reads_strings_only() {
        let input = json!({"ticker": "TSLA", "days": 7});
        assert_eq!(str_param(&input, "ticker").unwrap(), "TSLA");
        assert!(str_param(&input, "days").is_err());
        assert!(str_param(&input, "missing").is_err());
    }
}
