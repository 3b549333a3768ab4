//! Detection runtime HTTP client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use objcount_models::Detection;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, info_span, warn, Instrument};

use crate::detector::ObjectDetector;
use crate::error::{MlError, MlResult};
use crate::types::InferenceResponse;

/// Base delay between retries, doubled per attempt.
const RETRY_BASE_DELAY_MS: u64 = 500;
/// Backoff stops growing after this many doublings.
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

fn retry_delay_ms(attempt: u32) -> u64 {
    RETRY_BASE_DELAY_MS.saturating_mul(1 << attempt.min(MAX_BACKOFF_DOUBLINGS))
}

/// Pre-trained model used when none is configured.
pub const DEFAULT_MODEL: &str = "facebook/detr-resnet-50";

/// Configuration for the detection client.
#[derive(Clone)]
pub struct DetectionClientConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Bearer token, if the service requires one
    pub api_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl std::fmt::Debug for DetectionClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionClientConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for DetectionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(120), // first call may load the model
            max_retries: 0,
        }
    }
}

impl DetectionClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DETECTION_SERVICE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            model: std::env::var("DETECTION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_token: std::env::var("DETECTION_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            timeout: Duration::from_secs(
                std::env::var("DETECTION_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("DETECTION_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}

/// Client for a hosted object-detection model.
pub struct DetectionClient {
    http: Client,
    config: DetectionClientConfig,
}

impl DetectionClient {
    /// Create a new detection client.
    pub fn new(config: DetectionClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(DetectionClientConfig::from_env())
    }

    pub fn config(&self) -> &DetectionClientConfig {
        &self.config
    }

    /// Download the image the model should look at.
    async fn fetch_image(&self, image_url: &str) -> MlResult<(Vec<u8>, String)> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|e| self.map_transport(e, MlError::ImageFetch))?;

        if !response.status().is_success() {
            return Err(MlError::ImageFetch(format!(
                "{} returned {}",
                image_url,
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport(e, MlError::ImageFetch))?;

        Ok((bytes.to_vec(), content_type))
    }

    /// Post image bytes to the model and parse its detections.
    async fn infer(&self, image: Vec<u8>, content_type: &str) -> MlResult<Vec<Detection>> {
        let url = self.config.model_url();
        debug!("Sending {} bytes to {}", image.len(), url);

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-wait-for-model", "true")
            .body(image);

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.map_network(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_network(e))?;

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(MlError::ModelLoading(body));
        }
        if !status.is_success() {
            return Err(MlError::RequestFailed(format!(
                "Detection service returned {}: {}",
                status, body
            )));
        }

        match serde_json::from_str::<InferenceResponse>(&body)? {
            InferenceResponse::Detections(detections) => Ok(detections),
            InferenceResponse::Error(e) => Err(MlError::InvalidResponse(e.error)),
        }
    }

    fn map_network(&self, e: reqwest::Error) -> MlError {
        if e.is_timeout() {
            MlError::Timeout(self.config.timeout.as_secs())
        } else {
            MlError::Network(e)
        }
    }

    fn map_transport(&self, e: reqwest::Error, wrap: fn(String) -> MlError) -> MlError {
        if e.is_timeout() {
            MlError::Timeout(self.config.timeout.as_secs())
        } else {
            wrap(e.to_string())
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(retry_delay_ms(attempt));
                    warn!(
                        "Detection request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }
}

#[async_trait]
impl ObjectDetector for DetectionClient {
    async fn detect(&self, image_url: &str) -> MlResult<Vec<Detection>> {
        let span = info_span!("detect_objects", model = %self.config.model);
        async move {
            let start = Instant::now();
            let (image, content_type) = self.fetch_image(image_url).await?;
            let content_type = content_type.as_str();
            let detections = self
                .with_retry(|| self.infer(image.clone(), content_type))
                .await?;
            debug!(
                "Model returned {} detections in {:?}",
                detections.len(),
                start.elapsed()
            );
            Ok::<_, MlError>(detections)
        }
        .instrument(span)
        .await
    }

    async fn health_check(&self) -> MlResult<bool> {
        match self.http.get(&self.config.base_url).send().await {
            Ok(response) if !response.status().is_server_error() => Ok(true),
            Ok(response) => {
                warn!("Detection service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Detection service health check error: {}", e);
                Ok(false)
            }
        }
    }
}
