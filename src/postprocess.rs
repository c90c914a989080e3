//! Optional hooks run on a successful variation. Neither hook can fail a
//! generation: a missing or failed result keeps the original image.

use crate::error::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[async_trait]
pub trait ImagePostProcessor: Send + Sync {
    /// Returns processed PNG bytes, or `None` to keep the original image.
    async fn process(&self, image_url: &str) -> Option<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityVerdict {
    pub valid: bool,
    pub score: f32,
}

#[async_trait]
pub trait QualityScorer: Send + Sync {
    async fn score(&self, image_url: &str, prompt: &str) -> Result<QualityVerdict>;
}

pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_data_url() {
        assert_eq!(png_data_url(b"abc"), "data:image/png;base64,YWJj");
    }
}
