pub mod attempt;
pub mod backoff;
pub mod chain;

use crate::{
    config::Config,
    engine::{attempt::truncate, backoff::Backoff},
    error::{GenerationError, Result},
    models::{GenerationBatch, GenerationRequest, HealthStatus, ServiceState, StylePreset, VariationResult},
    postprocess::{png_data_url, ImagePostProcessor, QualityScorer},
    prompt::{variation_prompt, PromptEnricher, StandardEnricher},
    provider::ImageProvider,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use attempt::{AttemptReport, ModelAttempt};
pub use chain::FallbackChain;

/// Generates batches of image variations through the configured model chain.
///
/// Variations run one after another, each through the full fallback chain.
/// A batch either contains every requested variation or fails as a whole.
pub struct ImageGenerator {
    provider: Arc<dyn ImageProvider>,
    enricher: Arc<dyn PromptEnricher>,
    models: Vec<String>,
    max_retries: u32,
    backoff: Backoff,
    deadline: Option<Duration>,
    enable_processing: bool,
    enable_validation: bool,
    post_processor: Option<Arc<dyn ImagePostProcessor>>,
    scorer: Option<Arc<dyn QualityScorer>>,
}

impl ImageGenerator {
    /// Fails with [`GenerationError::Config`] when the retry delays or the
    /// deadline cannot be represented as durations.
    pub fn new(config: &Config, provider: Arc<dyn ImageProvider>) -> Result<Self> {
        Ok(Self {
            provider,
            enricher: Arc::new(StandardEnricher::new()),
            models: config.all_models(),
            max_retries: config.max_retries_per_model,
            backoff: Backoff::new(config.retry_base_delay, config.retry_max_delay)?,
            deadline: config.request_deadline()?,
            enable_processing: config.enable_processing,
            enable_validation: config.enable_validation,
            post_processor: None,
            scorer: None,
        })
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn PromptEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Takes effect only when `enable_processing` is set in the config.
    pub fn with_post_processor(mut self, processor: Arc<dyn ImagePostProcessor>) -> Self {
        self.post_processor = Some(processor);
        self
    }

    /// Takes effect only when `enable_validation` is set in the config.
    pub fn with_quality_scorer(mut self, scorer: Arc<dyn QualityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Makes backoff jitter reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.backoff.reseed(seed);
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationBatch> {
        self.generate_for(
            request.user_id(),
            request.prompt(),
            request.style().as_str(),
            request.width(),
            request.height(),
            request.num_variations(),
            request.include_text_in_ai(),
        )
        .await
    }

    /// Entry point for callers that already validated their input. Unknown
    /// styles fall back to modern.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_for(
        &self,
        user_id: &str,
        prompt: &str,
        style: &str,
        width: u32,
        height: u32,
        num_variations: u32,
        include_text_in_ai: bool,
    ) -> Result<GenerationBatch> {
        let start = Instant::now();
        let batch = self.run_batch(
            user_id,
            prompt,
            StylePreset::lenient(style),
            format!("{}x{}", width, height),
            num_variations,
            include_text_in_ai,
        );

        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, batch).await.unwrap_or_else(|_| {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                log::error!("❌ Deadline exceeded: user_id={} deadline_ms={}", user_id, limit.as_millis());
                Err(GenerationError::DeadlineExceeded { elapsed_ms })
            }),
            None => batch.await,
        }
    }

    async fn run_batch(
        &self,
        user_id: &str,
        prompt: &str,
        style: StylePreset,
        size: String,
        num_variations: u32,
        include_text_in_ai: bool,
    ) -> Result<GenerationBatch> {
        let start = Instant::now();
        let enriched = self.enricher.enrich(prompt, style, include_text_in_ai);

        log::info!(
            "🎨 Starting generation for '{}{}'",
            truncate(prompt, 50),
            if prompt.chars().count() > 50 { "..." } else { "" }
        );
        log::debug!(
            "Generation parameters: user_id={} prompt_length={} style={} size={} num_variations={}",
            user_id,
            prompt.chars().count(),
            style,
            size,
            num_variations
        );

        let chain = FallbackChain::new(self.provider.as_ref(), &self.backoff, self.max_retries);
        let mut variations = Vec::with_capacity(num_variations as usize);

        for index in 0..num_variations {
            if num_variations > 1 {
                log::info!("🔹 Generating variation {}/{}", index + 1, num_variations);
            }
            let prompt_for_variation = variation_prompt(&enriched, index as usize);
            let result = chain
                .run(&self.models, &prompt_for_variation, &size, index + 1)
                .await?;
            variations.push(self.finish_variation(result, prompt).await);
        }

        let total_time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "✅ All {} variation(s) generated in {:.1}s",
            num_variations,
            total_time_ms as f64 / 1000.0
        );

        Ok(GenerationBatch {
            num_generated: variations.len(),
            variations,
            total_time_ms,
        })
    }

    async fn finish_variation(&self, mut result: VariationResult, prompt: &str) -> VariationResult {
        if self.enable_processing {
            if let Some(processor) = &self.post_processor {
                log::info!("🔧 Applying post-processing pipeline...");
                match processor.process(&result.image_url).await {
                    Some(bytes) => result.image_url = png_data_url(&bytes),
                    None => log::warn!("⚠️  Post-processing failed, using original image"),
                }
            }
        }

        if self.enable_validation {
            if let Some(scorer) = &self.scorer {
                match scorer.score(&result.image_url, prompt).await {
                    Ok(verdict) => {
                        if verdict.valid {
                            log::info!("Quality validated (score: {:.3})", verdict.score);
                        } else {
                            log::warn!("⚠️  Quality score low ({:.3})", verdict.score);
                        }
                        result.quality_score = Some(verdict.score);
                    }
                    Err(e) => log::warn!("⚠️  Quality scoring failed: {}", e),
                }
            }
        }

        result
    }

    pub fn health_check(&self) -> HealthStatus {
        let start = Instant::now();
        if self.models.is_empty() {
            return HealthStatus {
                status: ServiceState::Unhealthy,
                latency_ms: None,
                models_available: 0,
                error: Some("No models configured".to_string()),
            };
        }

        HealthStatus {
            status: ServiceState::Healthy,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            models_available: self.models.len(),
            error: None,
        }
    }
}
