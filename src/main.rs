use markforge::{
    logger::{self, LoggerConfig},
    Config, GenerationRequest, HttpImageProvider, ImageGenerator, StylePreset,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = match Config::from_env().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut logger_config = LoggerConfig::for_environment(config.environment, &config.log_level);
    if let Some(path) = &config.log_file {
        logger_config = logger_config.with_file_output(path);
    }
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("❌ Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }
    if !dotenv_loaded {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }
    logger::log_startup_info(&config);

    let mut args = env::args().skip(1);
    let Some(prompt) = args.next() else {
        eprintln!("usage: markforge <prompt> [style] [variations]");
        return ExitCode::from(2);
    };
    let style = args.next().map(|s| StylePreset::lenient(&s)).unwrap_or(StylePreset::Modern);
    let variations = args.next().and_then(|n| n.parse().ok()).unwrap_or(1);

    let request = match GenerationRequest::builder("cli", prompt, style)
        .with_variations(variations)
        .build(&config)
    {
        Ok(request) => request,
        Err(e) => {
            log::error!("❌ Invalid request: {}", e);
            return ExitCode::from(2);
        }
    };

    let provider = match HttpImageProvider::new(&config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            log::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    let generator = match ImageGenerator::new(&config, provider) {
        Ok(generator) => generator,
        Err(e) => {
            log::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _timer = logger::timer("generation");
    match generator.generate(&request).await {
        Ok(batch) => {
            match serde_json::to_string_pretty(&batch) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("❌ Failed to serialize batch: {}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let body = e.to_body(config.is_production());
            log::error!("❌ Generation failed: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&body) {
                println!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
