//! Object detection capability.

use async_trait::async_trait;
use objcount_models::Detection;

use crate::error::MlResult;

/// A pre-trained object detector addressed by image URL.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Run detection on the image at `image_url`.
    async fn detect(&self, image_url: &str) -> MlResult<Vec<Detection>>;

    /// Whether the backing runtime is reachable.
    async fn health_check(&self) -> MlResult<bool> {
        Ok(true)
    }
}
