use crate::config::{Config, MIN_DIMENSION};
use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_PROMPT_LENGTH: usize = 3;
pub const MAX_VARIATIONS: u32 = 5;
pub const MAX_USER_ID_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Modern,
    Corporate,
    Creative,
    Minimalist,
    Vibrant,
    Elegant,
}

impl StylePreset {
    pub const ALL: [StylePreset; 6] = [
        StylePreset::Modern,
        StylePreset::Corporate,
        StylePreset::Creative,
        StylePreset::Minimalist,
        StylePreset::Vibrant,
        StylePreset::Elegant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::Modern => "modern",
            StylePreset::Corporate => "corporate",
            StylePreset::Creative => "creative",
            StylePreset::Minimalist => "minimalist",
            StylePreset::Vibrant => "vibrant",
            StylePreset::Elegant => "elegant",
        }
    }

    /// Parses a style name, falling back to `Modern` for anything unknown.
    pub fn lenient(name: &str) -> Self {
        name.parse().unwrap_or(StylePreset::Modern)
    }
}

impl FromStr for StylePreset {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        StylePreset::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| {
                GenerationError::validation(format!(
                    "Unknown style '{}', expected one of modern, corporate, creative, minimalist, vibrant, elegant",
                    s
                ))
            })
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    High,
    Ultra,
}

impl ImageQuality {
    /// Square edge length for this preset.
    pub fn edge(&self) -> u32 {
        match self {
            ImageQuality::Standard => 1024,
            ImageQuality::High => 1536,
            ImageQuality::Ultra => 2048,
        }
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        ImageQuality::High
    }
}

/// A validated generation request. Only obtainable through
/// [`GenerationRequestBuilder::build`].
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    user_id: String,
    prompt: String,
    style: StylePreset,
    width: u32,
    height: u32,
    num_variations: u32,
    quality: Option<ImageQuality>,
    include_text_in_ai: bool,
}

impl GenerationRequest {
    pub fn builder(
        user_id: impl Into<String>,
        prompt: impl Into<String>,
        style: StylePreset,
    ) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            user_id: user_id.into(),
            prompt: prompt.into(),
            style,
            width: None,
            height: None,
            num_variations: 1,
            quality: None,
            include_text_in_ai: false,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn style(&self) -> StylePreset {
        self.style
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_variations(&self) -> u32 {
        self.num_variations
    }

    pub fn quality(&self) -> Option<ImageQuality> {
        self.quality
    }

    pub fn include_text_in_ai(&self) -> bool {
        self.include_text_in_ai
    }

    /// Provider size string, e.g. `"1024x1024"`.
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    user_id: String,
    prompt: String,
    style: StylePreset,
    width: Option<u32>,
    height: Option<u32>,
    num_variations: u32,
    quality: Option<ImageQuality>,
    include_text_in_ai: bool,
}

impl GenerationRequestBuilder {
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the quality preset. Explicit dimensions take precedence over it.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_variations(mut self, num_variations: u32) -> Self {
        self.num_variations = num_variations;
        self
    }

    pub fn with_text_in_ai(mut self, include: bool) -> Self {
        self.include_text_in_ai = include;
        self
    }

    pub fn build(self, config: &Config) -> Result<GenerationRequest> {
        let user_id = self.user_id.trim().to_string();
        let user_id_len = user_id.chars().count();
        if user_id_len == 0 || user_id_len > MAX_USER_ID_LENGTH {
            return Err(GenerationError::validation(format!(
                "user_id must be between 1 and {} characters",
                MAX_USER_ID_LENGTH
            )));
        }

        let prompt = sanitize_prompt(&self.prompt);
        let prompt_len = prompt.chars().count();
        if prompt_len < MIN_PROMPT_LENGTH {
            return Err(GenerationError::validation(format!(
                "Prompt must be at least {} characters",
                MIN_PROMPT_LENGTH
            )));
        }
        if prompt_len > config.max_prompt_length {
            return Err(GenerationError::Validation {
                code: "PROMPT_TOO_LONG",
                message: format!(
                    "Prompt length ({}) exceeds maximum ({})",
                    prompt_len, config.max_prompt_length
                ),
            });
        }

        let preset = self.quality.map(|q| q.edge());
        let width = self
            .width
            .or(preset)
            .unwrap_or(config.default_width);
        let height = self
            .height
            .or(preset)
            .unwrap_or(config.default_height);
        if !(MIN_DIMENSION..=config.max_width).contains(&width)
            || !(MIN_DIMENSION..=config.max_height).contains(&height)
        {
            return Err(GenerationError::Validation {
                code: "INVALID_DIMENSIONS",
                message: format!(
                    "Dimensions {}x{} must be within {}..={}x{}..={}",
                    width, height, MIN_DIMENSION, config.max_width, MIN_DIMENSION, config.max_height
                ),
            });
        }

        if !(1..=MAX_VARIATIONS).contains(&self.num_variations) {
            return Err(GenerationError::validation(format!(
                "num_variations must be between 1 and {}, got {}",
                MAX_VARIATIONS, self.num_variations
            )));
        }

        Ok(GenerationRequest {
            user_id,
            prompt,
            style: self.style,
            width: round_to_multiple_of_64(width),
            height: round_to_multiple_of_64(height),
            num_variations: self.num_variations,
            quality: self.quality,
            include_text_in_ai: self.include_text_in_ai,
        })
    }
}

/// Rounds down to the nearest multiple of 64.
pub fn round_to_multiple_of_64(value: u32) -> u32 {
    value - value % 64
}

/// Trims and collapses runs of whitespace into single spaces.
pub fn sanitize_prompt(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new().with_api_key("sk-test")
    }

    #[test]
    fn test_dimension_rounding() {
        assert_eq!(round_to_multiple_of_64(1000), 960);
        assert_eq!(round_to_multiple_of_64(1024), 1024);
        assert_eq!(round_to_multiple_of_64(2047), 1984);

        let request = GenerationRequest::builder("user_1", "coffee shop logo", StylePreset::Modern)
            .with_dimensions(1000, 1024)
            .build(&config())
            .unwrap();
        assert_eq!(request.width(), 960);
        assert_eq!(request.height(), 1024);
        assert_eq!(request.size(), "960x1024");
    }

    #[test]
    fn test_quality_preset_and_defaults() {
        let cfg = config();
        let ultra = GenerationRequest::builder("u", "fox mascot", StylePreset::Vibrant)
            .with_quality(ImageQuality::Ultra)
            .build(&cfg)
            .unwrap();
        assert_eq!(ultra.size(), "2048x2048");
        assert_eq!(ultra.quality(), Some(ImageQuality::Ultra));

        let explicit = GenerationRequest::builder("u", "fox mascot", StylePreset::Vibrant)
            .with_quality(ImageQuality::Ultra)
            .with_dimensions(768, 768)
            .build(&cfg)
            .unwrap();
        assert_eq!(explicit.size(), "768x768");

        let plain = GenerationRequest::builder("u", "fox mascot", StylePreset::Vibrant)
            .build(&cfg)
            .unwrap();
        assert_eq!(plain.size(), "1024x1024");
    }

    #[test]
    fn test_prompt_is_sanitized_and_bounded() {
        let cfg = config();
        let request = GenerationRequest::builder("u", "  a   bold\n\tlion  ", StylePreset::Elegant)
            .build(&cfg)
            .unwrap();
        assert_eq!(request.prompt(), "a bold lion");

        let short = GenerationRequest::builder("u", "  ab ", StylePreset::Elegant).build(&cfg);
        assert_eq!(short.unwrap_err().code(), "VALIDATION_ERROR");

        let long = GenerationRequest::builder("u", "x".repeat(2001), StylePreset::Elegant).build(&cfg);
        assert_eq!(long.unwrap_err().code(), "PROMPT_TOO_LONG");
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cfg = config();
        let small = GenerationRequest::builder("u", "tree logo", StylePreset::Modern)
            .with_dimensions(256, 1024)
            .build(&cfg);
        assert_eq!(small.unwrap_err().code(), "INVALID_DIMENSIONS");

        let too_many = GenerationRequest::builder("u", "tree logo", StylePreset::Modern)
            .with_variations(6)
            .build(&cfg);
        assert!(too_many.is_err());

        let none = GenerationRequest::builder("u", "tree logo", StylePreset::Modern)
            .with_variations(0)
            .build(&cfg);
        assert!(none.is_err());

        let anonymous = GenerationRequest::builder("  ", "tree logo", StylePreset::Modern).build(&cfg);
        assert!(anonymous.is_err());
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("Corporate".parse::<StylePreset>().unwrap(), StylePreset::Corporate);
        assert!("retro".parse::<StylePreset>().is_err());
        assert_eq!(StylePreset::lenient("retro"), StylePreset::Modern);
        assert_eq!(StylePreset::lenient("minimalist"), StylePreset::Minimalist);
    }
}
