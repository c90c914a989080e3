use crate::error::{GenerationError, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.a4f.co/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "provider-5/flux-fast";
/// Upper bound for any configured delay or deadline, in seconds.
pub const MAX_DELAY_SECS: f64 = 3600.0;
pub const MIN_DIMENSION: u32 = 512;
pub const DEFAULT_FALLBACK_MODELS: &str = "provider-4/flux-schnell,provider-4/imagen-4,provider-4/imagen-3.5,provider-4/qwen-image,provider-5/dall-e-2,provider-5/imagen-4-fast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(GenerationError::Config(format!(
                "environment must be one of development|staging|production, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub log_level: String,
    pub log_file: Option<String>,

    pub api_key: Option<String>,
    pub base_url: String,
    pub api_timeout_secs: u64,

    pub primary_model: String,
    pub fallback_models: Vec<String>,

    pub max_retries_per_model: u32,
    pub retry_base_delay: f64,
    pub retry_max_delay: f64,

    pub default_width: u32,
    pub default_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_prompt_length: usize,

    pub enable_processing: bool,
    pub enable_validation: bool,
    pub request_deadline_secs: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environment: Environment::Development,
            log_level: "INFO".to_string(),
            log_file: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: 120,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_models: split_models(DEFAULT_FALLBACK_MODELS),
            max_retries_per_model: 2,
            retry_base_delay: 1.0,
            retry_max_delay: 10.0,
            default_width: 1024,
            default_height: 1024,
            max_width: 2048,
            max_height: 2048,
            max_prompt_length: 2000,
            enable_processing: false,
            enable_validation: false,
            request_deadline_secs: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads configuration from the process environment. Call `dotenv::dotenv()`
    /// first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Unset keys keep
    /// their defaults; set keys that fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("ENVIRONMENT") {
            config.environment = value.parse()?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            config.log_level = value.trim().to_uppercase();
        }
        config.log_file = lookup("LOG_FILE").filter(|path| !path.trim().is_empty());
        config.api_key = lookup("IMAGE_API_KEY").filter(|key| !key.trim().is_empty());
        if let Some(value) = lookup("IMAGE_API_BASE_URL") {
            config.base_url = value.trim().trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("API_TIMEOUT") {
            config.api_timeout_secs = parse_var("API_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("PRIMARY_MODEL") {
            config.primary_model = value.trim().to_string();
        }
        if let Some(value) = lookup("FALLBACK_MODELS") {
            config.fallback_models = split_models(&value);
        }
        if let Some(value) = lookup("MAX_RETRIES_PER_MODEL") {
            config.max_retries_per_model = parse_var("MAX_RETRIES_PER_MODEL", &value)?;
        }
        if let Some(value) = lookup("RETRY_BASE_DELAY") {
            config.retry_base_delay = parse_var("RETRY_BASE_DELAY", &value)?;
        }
        if let Some(value) = lookup("RETRY_MAX_DELAY") {
            config.retry_max_delay = parse_var("RETRY_MAX_DELAY", &value)?;
        }
        if let Some(value) = lookup("DEFAULT_WIDTH") {
            config.default_width = parse_var("DEFAULT_WIDTH", &value)?;
        }
        if let Some(value) = lookup("DEFAULT_HEIGHT") {
            config.default_height = parse_var("DEFAULT_HEIGHT", &value)?;
        }
        if let Some(value) = lookup("MAX_WIDTH") {
            config.max_width = parse_var("MAX_WIDTH", &value)?;
        }
        if let Some(value) = lookup("MAX_HEIGHT") {
            config.max_height = parse_var("MAX_HEIGHT", &value)?;
        }
        if let Some(value) = lookup("MAX_PROMPT_LENGTH") {
            config.max_prompt_length = parse_var("MAX_PROMPT_LENGTH", &value)?;
        }
        config.enable_processing = lookup("ENABLE_PROCESSING").map_or(false, |v| is_truthy(&v));
        config.enable_validation = lookup("ENABLE_VALIDATION").map_or(false, |v| is_truthy(&v));
        if let Some(value) = lookup("REQUEST_DEADLINE_SECS") {
            config.request_deadline_secs = Some(parse_var("REQUEST_DEADLINE_SECS", &value)?);
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        primary: impl Into<String>,
        fallbacks: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.primary_model = primary.into();
        self.fallback_models = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retries(mut self, max_retries_per_model: u32) -> Self {
        self.max_retries_per_model = max_retries_per_model;
        self
    }

    pub fn with_retry_delays(mut self, base_secs: f64, max_secs: f64) -> Self {
        self.retry_base_delay = base_secs;
        self.retry_max_delay = max_secs;
        self
    }

    pub fn with_deadline(mut self, secs: f64) -> Self {
        self.request_deadline_secs = Some(secs);
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Primary model followed by the fallbacks, in priority order.
    pub fn all_models(&self) -> Vec<String> {
        std::iter::once(self.primary_model.clone())
            .chain(self.fallback_models.iter().cloned())
            .collect()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn request_deadline(&self) -> Result<Option<Duration>> {
        self.request_deadline_secs
            .map(|secs| seconds("REQUEST_DEADLINE_SECS", secs))
            .transpose()
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(GenerationError::Config("IMAGE_API_KEY is required".into()));
        }
        if self.primary_model.trim().is_empty() {
            return Err(GenerationError::Config("PRIMARY_MODEL must not be empty".into()));
        }
        if !(10..=300).contains(&self.api_timeout_secs) {
            return Err(GenerationError::Config(format!(
                "API_TIMEOUT must be within 10..=300 seconds, got {}",
                self.api_timeout_secs
            )));
        }
        if !(1..=5).contains(&self.max_retries_per_model) {
            return Err(GenerationError::Config(format!(
                "MAX_RETRIES_PER_MODEL must be within 1..=5, got {}",
                self.max_retries_per_model
            )));
        }
        seconds("RETRY_BASE_DELAY", self.retry_base_delay)?;
        seconds("RETRY_MAX_DELAY", self.retry_max_delay)?;
        if self.retry_base_delay > self.retry_max_delay {
            return Err(GenerationError::Config(format!(
                "RETRY_BASE_DELAY ({}) exceeds RETRY_MAX_DELAY ({})",
                self.retry_base_delay, self.retry_max_delay
            )));
        }
        self.request_deadline()?;
        if self.max_width < MIN_DIMENSION || self.max_height < MIN_DIMENSION {
            return Err(GenerationError::Config(format!(
                "MAX_WIDTH and MAX_HEIGHT must be at least {}",
                MIN_DIMENSION
            )));
        }
        if !(MIN_DIMENSION..=self.max_width).contains(&self.default_width)
            || !(MIN_DIMENSION..=self.max_height).contains(&self.default_height)
        {
            return Err(GenerationError::Config(format!(
                "DEFAULT_WIDTH/DEFAULT_HEIGHT ({}x{}) must be within {}..={}x{}..={}",
                self.default_width,
                self.default_height,
                MIN_DIMENSION,
                self.max_width,
                MIN_DIMENSION,
                self.max_height
            )));
        }
        match self.log_level.as_str() {
            "TRACE" | "DEBUG" | "INFO" | "WARNING" | "WARN" | "ERROR" | "CRITICAL" => Ok(()),
            other => Err(GenerationError::Config(format!(
                "LOG_LEVEL must be one of DEBUG|INFO|WARNING|ERROR, got '{}'",
                other
            ))),
        }
    }
}

/// Converts a configured number of seconds into a `Duration`, rejecting
/// values that are not finite, not positive or above [`MAX_DELAY_SECS`].
pub fn seconds(key: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 || secs > MAX_DELAY_SECS {
        return Err(GenerationError::Config(format!(
            "{} must be a positive number of seconds up to {}, got {}",
            key, MAX_DELAY_SECS, secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| GenerationError::Config(format!("{} is not a valid duration: {}", key, e)))
}

fn split_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(String::from)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GenerationError::Config(format!("{} has an invalid value: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
        assert_eq!(config.fallback_models.len(), 6);
        assert_eq!(config.all_models()[0], DEFAULT_PRIMARY_MODEL);
        assert_eq!(config.max_retries_per_model, 2);
        assert_eq!(config.retry_base_delay, 1.0);
        assert_eq!(config.retry_max_delay, 10.0);
        assert!(config.request_deadline().unwrap().is_none());
        assert!(config.log_file.is_none());
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_model_list_parsing() {
        let config = Config::from_lookup(lookup_from(&[
            ("PRIMARY_MODEL", " model-a "),
            ("FALLBACK_MODELS", "model-b, ,model-c,"),
        ]))
        .unwrap();
        assert_eq!(config.all_models(), vec!["model-a", "model-b", "model-c"]);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MAX_RETRIES_PER_MODEL", "three")]))
            .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_validate_ranges() {
        let base = Config::new().with_api_key("sk-test");
        assert!(base.validate().is_ok());

        assert!(Config::new().validate().is_err());
        assert!(base.clone().with_retries(0).validate().is_err());
        assert!(base.clone().with_retries(6).validate().is_err());
        assert!(base.clone().with_retry_delays(5.0, 1.0).validate().is_err());

        let mut short_timeout = base.clone();
        short_timeout.api_timeout_secs = 5;
        assert!(short_timeout.validate().is_err());
    }

    #[test]
    fn test_environment_parsing() {
        let config = Config::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "Production"),
            ("ENABLE_PROCESSING", "true"),
            ("REQUEST_DEADLINE_SECS", "90"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(config.enable_processing);
        assert!(!config.enable_validation);
        assert_eq!(config.request_deadline().unwrap(), Some(Duration::from_secs(90)));

        assert!(Config::from_lookup(lookup_from(&[("ENVIRONMENT", "qa")])).is_err());
    }

    #[test]
    fn test_non_finite_and_huge_delays_are_rejected() {
        for raw in ["inf", "NaN", "1e30", "-1", "0"] {
            let config = Config::from_lookup(lookup_from(&[
                ("IMAGE_API_KEY", "sk-test"),
                ("REQUEST_DEADLINE_SECS", raw),
            ]))
            .unwrap();
            assert_eq!(config.validate().unwrap_err().code(), "CONFIGURATION_ERROR", "deadline {}", raw);
            assert!(config.request_deadline().is_err());

            let config = Config::from_lookup(lookup_from(&[
                ("IMAGE_API_KEY", "sk-test"),
                ("RETRY_BASE_DELAY", raw),
                ("RETRY_MAX_DELAY", raw),
            ]))
            .unwrap();
            assert!(config.validate().is_err(), "retry delays {}", raw);
        }

        let capped = Config::new().with_api_key("sk-test").with_retry_delays(1.0, MAX_DELAY_SECS);
        assert!(capped.validate().is_ok());
        assert!(capped.with_retry_delays(1.0, MAX_DELAY_SECS + 1.0).validate().is_err());
    }

    #[test]
    fn test_default_dimensions_must_fit_bounds() {
        let config = Config::from_lookup(lookup_from(&[
            ("IMAGE_API_KEY", "sk-test"),
            ("DEFAULT_WIDTH", "100"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_lookup(lookup_from(&[
            ("IMAGE_API_KEY", "sk-test"),
            ("DEFAULT_HEIGHT", "1536"),
            ("MAX_HEIGHT", "1024"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_file_is_optional() {
        let config = Config::from_lookup(lookup_from(&[("LOG_FILE", "/tmp/markforge.log")])).unwrap();
        assert_eq!(config.log_file.as_deref(), Some("/tmp/markforge.log"));
        assert!(Config::from_lookup(lookup_from(&[("LOG_FILE", " ")])).unwrap().log_file.is_none());
    }
}
