use crate::{
    engine::{attempt::ModelAttempt, backoff::Backoff},
    error::{GenerationError, Result},
    models::{AttemptOutcome, ErrorRecord, VariationResult},
    provider::ImageProvider,
};
use std::time::Instant;

/// Tries models strictly in priority order until one produces an image.
pub struct FallbackChain<'a> {
    attempt: ModelAttempt<'a>,
    max_retries: u32,
}

impl<'a> FallbackChain<'a> {
    pub fn new(provider: &'a dyn ImageProvider, backoff: &'a Backoff, max_retries: u32) -> Self {
        Self {
            attempt: ModelAttempt::new(provider, backoff),
            max_retries,
        }
    }

    pub async fn run(
        &self,
        models: &[String],
        prompt: &str,
        size: &str,
        variation_number: u32,
    ) -> Result<VariationResult> {
        let start = Instant::now();
        let mut errors: Vec<ErrorRecord> = Vec::new();
        let mut attempts = 0;

        for model in models {
            let report = self
                .attempt
                .attempt(model, prompt, size, self.max_retries)
                .await;
            attempts += report.calls;

            match report.outcome {
                AttemptOutcome::Success {
                    image_url,
                    elapsed_ms,
                } => {
                    log::info!(
                        "✅ Variation generated: variation={} model={} attempts={} call_ms={}",
                        variation_number,
                        model,
                        attempts,
                        elapsed_ms
                    );
                    return Ok(VariationResult {
                        image_url,
                        model_used: model.clone(),
                        generation_time_ms: start.elapsed().as_millis() as u64,
                        variation_number,
                        attempts,
                        quality_score: None,
                    });
                }
                AttemptOutcome::Failure { reason, .. } => {
                    log::warn!("Model failed: model={} variation={} error={}", model, variation_number, reason);
                    errors.push(ErrorRecord {
                        model: model.clone(),
                        error_message: reason,
                    });
                }
            }
        }

        let last_error = errors
            .last()
            .map(|record| record.error_message.clone())
            .unwrap_or_else(|| "Unknown error".to_string());

        log::error!(
            "❌ All models failed: variation={} models_tried={} attempts={} total_time_ms={} errors={}",
            variation_number,
            models.len(),
            attempts,
            start.elapsed().as_millis(),
            serde_json::to_string(&errors).unwrap_or_default()
        );

        Err(GenerationError::AllModelsFailed {
            models_tried: models.len(),
            last_error,
        })
    }
}
