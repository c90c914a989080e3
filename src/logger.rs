use crate::config::Environment;
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static ENGINE_LOGGER: Lazy<EngineLogger> = Lazy::new(EngineLogger::new);

/// Installs the global logger. Calling it again only swaps the configuration.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level;
    ENGINE_LOGGER.update_config(config)?;

    // already installed by an earlier call
    let _ = log::set_logger(&*ENGINE_LOGGER);
    log::set_max_level(level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Parses `DEBUG|INFO|WARNING|ERROR|CRITICAL` style names.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            file: record.file().unwrap_or("unknown").to_string(),
            line: record.line().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub format: LogFormat,
    pub show_colors: bool,
    pub show_file_location: bool,
    pub timestamp_format: String,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            format: LogFormat::Text,
            show_colors: true,
            show_file_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }

    pub fn production() -> Self {
        Self {
            min_level: LevelFilter::Info,
            format: LogFormat::Json,
            show_colors: false,
            ..Default::default()
        }
    }

    /// Colored text in development, JSON lines everywhere else.
    pub fn for_environment(environment: Environment, level: &str) -> Self {
        let base = match environment {
            Environment::Development => Self::development(),
            Environment::Staging | Environment::Production => Self::production(),
        };
        base.with_level(parse_level(level))
    }
}

pub struct EngineLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl EngineLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };

        *self.log_file.lock().map_err(|e| e.to_string())? = file;
        *self.config.lock().map_err(|e| e.to_string())? = new_config;
        Ok(())
    }

    fn format_text(entry: &LogEntry, level: Level, config: &LoggerConfig) -> String {
        let mut output = String::new();

        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let level_str = format!("{:<5}", entry.level);
        if config.show_colors {
            output.push_str(&format!(
                "{} [{}] {}: {}",
                timestamp.bright_black(),
                level_str.color(level_color(level)).bold(),
                entry.target.bright_blue(),
                entry.message
            ));
        } else {
            output.push_str(&format!(
                "{} [{}] {}: {}",
                timestamp, level_str, entry.target, entry.message
            ));
        }

        if config.show_file_location {
            let location = format!(" ({}:{})", entry.file, entry.line);
            if config.show_colors {
                output.push_str(&location.bright_black().to_string());
            } else {
                output.push_str(&location);
            }
        }

        output
    }

    fn render(entry: &LogEntry, level: Level, config: &LoggerConfig) -> String {
        match config.format {
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_default(),
            LogFormat::Text => Self::format_text(entry, level, config),
        }
    }
}

impl log::Log for EngineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record);
        let line = match self.config.lock() {
            Ok(config) => Self::render(&entry, record.level(), &config),
            Err(_) => return,
        };

        if record.level() <= Level::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }

        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a named operation took when stopped or dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} completed in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(config: &crate::config::Config) {
    log::info!(
        "🚀 {} v{} starting in {} mode",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.environment
    );
    log::info!(
        "🤖 Configured with {} models (primary: {})",
        config.all_models().len(),
        config.primary_model
    );
    log::info!(
        "🔁 Retries per model: {}, backoff {:.1}s..{:.1}s",
        config.max_retries_per_model,
        config.retry_base_delay,
        config.retry_max_delay
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LogEntry {
        LogEntry {
            id: "id-1".into(),
            timestamp: Utc::now(),
            level: "WARN".into(),
            target: "markforge::engine".into(),
            message: "m1 failed on attempt 1/2".into(),
            file: "src/engine/attempt.rs".into(),
            line: 91,
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("warning"), LevelFilter::Warn);
        assert_eq!(parse_level("CRITICAL"), LevelFilter::Error);
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_environment_presets() {
        let dev = LoggerConfig::for_environment(Environment::Development, "INFO");
        assert_eq!(dev.format, LogFormat::Text);
        assert_eq!(dev.min_level, LevelFilter::Info);

        let prod = LoggerConfig::for_environment(Environment::Production, "WARNING");
        assert_eq!(prod.format, LogFormat::Json);
        assert!(!prod.show_colors);
        assert_eq!(prod.min_level, LevelFilter::Warn);
    }

    #[test]
    fn test_json_rendering() {
        let line = EngineLogger::render(&sample_entry(), Level::Warn, &LoggerConfig::production());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "markforge::engine");
        assert_eq!(value["line"], 91);
    }

    #[test]
    fn test_text_rendering_without_colors() {
        let config = LoggerConfig {
            show_colors: false,
            show_file_location: true,
            ..LoggerConfig::default()
        };
        let line = EngineLogger::render(&sample_entry(), Level::Warn, &config);
        assert!(line.contains("[WARN ] markforge::engine: m1 failed on attempt 1/2"));
        assert!(line.ends_with("(src/engine/attempt.rs:91)"));
    }

    #[test]
    fn test_repeated_initialization_is_ok() {
        assert!(init_with_config(LoggerConfig::development()).is_ok());
        assert!(init_with_config(LoggerConfig::production()).is_ok());
    }

    #[test]
    fn test_file_output_is_appended() {
        let path = std::env::temp_dir().join(format!("markforge-{}.log", Uuid::new_v4()));
        let path_str = path.to_string_lossy().to_string();
        let config = LoggerConfig {
            show_colors: false,
            ..LoggerConfig::development()
        }
        .with_file_output(&path_str);
        assert_eq!(config.log_file_path.as_deref(), Some(path_str.as_str()));

        let logger = EngineLogger::new();
        logger.update_config(config).unwrap();
        log::Log::log(
            &logger,
            &Record::builder()
                .level(Level::Info)
                .target("markforge::engine")
                .args(format_args!("variation 1 done"))
                .build(),
        );
        log::Log::flush(&logger);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("markforge::engine: variation 1 done"));
        let _ = std::fs::remove_file(&path);
    }
}
