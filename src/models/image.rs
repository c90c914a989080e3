use serde::{Deserialize, Serialize};

/// Body of an OpenAI-compatible `POST /images/generations` call.
#[derive(Debug, Clone, Serialize)]
pub struct ImagesRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

impl ImagesResponse {
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImagesResponse {
            data: urls
                .into_iter()
                .map(|url| ImageData {
                    url: Some(url.into()),
                    b64_json: None,
                })
                .collect(),
        }
    }

    /// First image as something a browser can load: the url itself, or a
    /// PNG data URL when the provider only returned base64.
    pub fn first_image_url(&self) -> Option<String> {
        let image = self.data.first()?;
        match (&image.url, &image.b64_json) {
            (Some(url), _) if !url.is_empty() => Some(url.clone()),
            (_, Some(b64)) if !b64.is_empty() => Some(format!("data:image/png;base64,{}", b64)),
            _ => None,
        }
    }
}

/// One generated image within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationResult {
    pub image_url: String,
    pub model_used: String,
    pub generation_time_ms: u64,
    pub variation_number: u32,
    /// Provider calls spent on this variation across every model tried.
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationBatch {
    pub variations: Vec<VariationResult>,
    pub total_time_ms: u64,
    pub num_generated: usize,
}
