use crate::{
    config::Config,
    error::{GenerationError, ProviderError, Result},
    models::{ImagesRequest, ImagesResponse},
    provider::ImageProvider,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// OpenAI-compatible `images/generations` client.
#[derive(Clone)]
pub struct HttpImageProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpImageProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenerationError::Config("IMAGE_API_KEY is required".into()))?;

        let client = Client::builder()
            .timeout(config.api_timeout())
            .build()
            .map_err(|e| GenerationError::Config(format!("Failed to build HTTP client: {}", e)))?;

        log::info!(
            "Image provider client initialized for {} ({} models)",
            config.base_url,
            config.all_models().len()
        );

        Ok(Self {
            client,
            endpoint: format!("{}/images/generations", config.base_url.trim_end_matches('/')),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for HttpImageProvider {
    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        n: u32,
        size: &str,
    ) -> std::result::Result<ImagesResponse, ProviderError> {
        let body = ImagesRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            n,
            size: size.to_string(),
        };

        log::debug!("POST {} model={} size={}", self.endpoint, model, size);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::unexpected("DecodeError", e.to_string()))
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() || err.is_body() {
        ProviderError::ConnectionFailed(err.to_string())
    } else if err.is_decode() {
        ProviderError::unexpected("DecodeError", err.to_string())
    } else {
        ProviderError::unexpected("RequestError", err.to_string())
    }
}

/// Maps a non-success HTTP response onto the provider error taxonomy.
pub fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Timeout(message)
        }
        _ => ProviderError::api(Some(status.as_u16()), message),
    }
}

// {"error": {"message": "..."}} or {"error": "..."} or {"message": "..."}
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .or_else(|| json["message"].as_str())
        .map(String::from)
}
