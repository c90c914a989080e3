//! Image generation through an ordered chain of provider models.
//!
//! A [`GenerationRequest`] is enriched into a provider-ready prompt, then each
//! requested variation walks the configured models in priority order with
//! bounded, jittered retries per model. The first model that returns an image
//! wins; if every model fails for any variation the whole batch fails with
//! [`GenerationError::AllModelsFailed`].

pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod models;
pub mod postprocess;
pub mod prompt;
pub mod provider;

pub use config::{Config, Environment};
pub use engine::ImageGenerator;
pub use error::{GenerationError, ProviderError, Result};
pub use models::*;
pub use postprocess::{ImagePostProcessor, QualityScorer, QualityVerdict};
pub use prompt::{PromptEnricher, StandardEnricher};
pub use provider::{HttpImageProvider, ImageProvider};
