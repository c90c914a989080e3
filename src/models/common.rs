use serde::{Deserialize, Serialize};

/// Result of one [`attempt`](crate::engine::attempt::ModelAttempt::attempt) against a single model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success { image_url: String, elapsed_ms: u64 },
    Failure { reason: String, retryable: bool },
}

impl AttemptOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        AttemptOutcome::Failure {
            reason: reason.into(),
            retryable: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub model: String,
    pub error_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub models_available: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
