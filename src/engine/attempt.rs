use crate::{
    engine::backoff::Backoff,
    error::ProviderError,
    models::AttemptOutcome,
    provider::ImageProvider,
};
use std::time::Instant;

pub const API_ERROR_LIMIT: usize = 200;
pub const UNEXPECTED_ERROR_LIMIT: usize = 150;
const RATE_LIMIT_MULTIPLIER: f64 = 2.0;

/// How a provider error affects the current model.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorClass {
    /// Back off by `multiplier` and call the same model again.
    Retry { multiplier: f64 },
    /// Give up on this model with the given reason.
    Skip(String),
}

pub fn classify(err: &ProviderError) -> ErrorClass {
    match err {
        ProviderError::RateLimited(_) => ErrorClass::Retry {
            multiplier: RATE_LIMIT_MULTIPLIER,
        },
        ProviderError::ConnectionFailed(_) | ProviderError::Timeout(_) => {
            ErrorClass::Retry { multiplier: 1.0 }
        }
        ProviderError::Api { message, .. } if message.to_lowercase().contains("timeout") => {
            ErrorClass::Retry { multiplier: 1.0 }
        }
        ProviderError::Api { message, .. } => {
            ErrorClass::Skip(truncate(message, API_ERROR_LIMIT))
        }
        ProviderError::Unexpected { kind, message } => ErrorClass::Skip(format!(
            "{}: {}",
            kind,
            truncate(message, UNEXPECTED_ERROR_LIMIT)
        )),
    }
}

/// Truncates on a character boundary.
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    pub outcome: AttemptOutcome,
    /// Provider calls made for this model.
    pub calls: u32,
}

/// Calls a single model up to `max_retries` times.
pub struct ModelAttempt<'a> {
    provider: &'a dyn ImageProvider,
    backoff: &'a Backoff,
}

impl<'a> ModelAttempt<'a> {
    pub fn new(provider: &'a dyn ImageProvider, backoff: &'a Backoff) -> Self {
        Self { provider, backoff }
    }

    pub async fn attempt(
        &self,
        model: &str,
        prompt: &str,
        size: &str,
        max_retries: u32,
    ) -> AttemptReport {
        let mut calls = 0;

        for retry in 0..max_retries {
            log::debug!("Calling provider: model={} retry={} max_retries={}", model, retry, max_retries);

            let start = Instant::now();
            let result = self.provider.generate_image(model, prompt, 1, size).await;
            calls += 1;

            let err = match result {
                Ok(response) => {
                    let outcome = match response.first_image_url() {
                        Some(image_url) => AttemptOutcome::Success {
                            image_url,
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        },
                        None => {
                            log::warn!("⚠️  No image data: model={} retry={}", model, retry);
                            AttemptOutcome::failure("No image data")
                        }
                    };
                    return AttemptReport { outcome, calls };
                }
                Err(err) => err,
            };

            match classify(&err) {
                ErrorClass::Retry { multiplier } => {
                    log::warn!(
                        "⚠️  Retryable error: model={} retry={} max_retries={} error={}",
                        model,
                        retry,
                        max_retries,
                        err
                    );
                    // no sleep after the final try
                    if retry + 1 < max_retries {
                        self.backoff.wait(retry, multiplier).await;
                    }
                }
                ErrorClass::Skip(reason) => {
                    log::warn!("⚠️  Skipping model: model={} retry={} error={}", model, retry, reason);
                    return AttemptReport {
                        outcome: AttemptOutcome::failure(reason),
                        calls,
                    };
                }
            }
        }

        AttemptReport {
            outcome: AttemptOutcome::failure(format!("Exhausted {} retries", max_retries)),
            calls,
        }
    }
}
