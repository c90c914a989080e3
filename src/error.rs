use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Failure reported by an [`ImageProvider`](crate::provider::ImageProvider) call.
///
/// The engine matches on these variants to decide whether a model is worth
/// retrying or should be skipped.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    #[error("{kind}: {message}")]
    Unexpected { kind: String, message: String },
}

impl ProviderError {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        ProviderError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn unexpected(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unexpected {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("All {models_tried} models failed to generate image")]
    AllModelsFailed {
        models_tried: usize,
        last_error: String,
    },

    #[error("Generation exceeded its deadline after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    pub fn validation(message: impl Into<String>) -> Self {
        GenerationError::Validation {
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Config(_) => "CONFIGURATION_ERROR",
            GenerationError::Validation { code, .. } => code,
            GenerationError::AllModelsFailed { .. } => "ALL_MODELS_FAILED",
            GenerationError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            GenerationError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GenerationError::Validation { .. } => 400,
            GenerationError::DeadlineExceeded { .. } => 504,
            GenerationError::Config(_)
            | GenerationError::AllModelsFailed { .. }
            | GenerationError::Internal(_) => 500,
        }
    }

    /// Response envelope for the caller. Internal details are hidden when
    /// `production` is set.
    pub fn to_body(&self, production: bool) -> ErrorBody {
        let (message, details) = match self {
            GenerationError::AllModelsFailed {
                models_tried,
                last_error,
            } => (
                self.to_string(),
                json!({ "models_tried": models_tried, "last_error": last_error }),
            ),
            GenerationError::DeadlineExceeded { elapsed_ms } => {
                (self.to_string(), json!({ "elapsed_ms": elapsed_ms }))
            }
            GenerationError::Internal(_) | GenerationError::Config(_) if production => (
                "An unexpected error occurred".to_string(),
                json!({}),
            ),
            _ => (self.to_string(), json!({})),
        };

        ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Value,
}

pub type Result<T> = std::result::Result<T, GenerationError>;
