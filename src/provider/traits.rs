use crate::{error::ProviderError, models::ImagesResponse};
use async_trait::async_trait;

/// A backend able to turn a prompt into images for a named model.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        n: u32,
        size: &str,
    ) -> std::result::Result<ImagesResponse, ProviderError>;
}
