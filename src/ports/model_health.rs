//! Model Health Port - Availability checks for a local inference server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for checking that a local inference server and model are usable.
///
/// Checks never fail; problems are reported in the returned [`HealthReport`].
#[async_trait]
pub trait ModelHealthCheck: Send + Sync {
    /// Checks that the server answers.
    async fn check_server(&self) -> HealthReport;

    /// Checks that `model` is installed on the server.
    async fn check_model(&self, model: &str) -> HealthReport;
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub available: bool,
    pub message: String,
}

impl HealthReport {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }

    /// `(available, message)` pair.
    pub fn into_tuple(self) -> (bool, String) {
        (self.available, self.message)
    }
}
