//! Upload → detect → aggregate pipeline behind the detection endpoint.

use std::sync::Arc;
use std::time::Instant;

use objcount_hosting::{FileHost, HostingError};
use objcount_ml_client::{MlError, ObjectDetector};
use objcount_models::{count_labels, DetectResponse, UploadedFile};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::security::AssetUrlPolicy;

/// Message reported when the hosting service yields no usable URL.
pub const MISSING_URL: &str = "Failed to retrieve URL from upload response.";

/// Failure of one pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Config(HostingError),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    Upload(HostingError),

    #[error("Failed to retrieve URL from upload response.")]
    MissingUrl,

    #[error("{0}")]
    Detection(#[from] MlError),
}

impl PipelineError {
    pub fn form(msg: impl Into<String>) -> Self {
        Self::Form(msg.into())
    }

    /// Stage label used in logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "config",
            PipelineError::Form(_) => "form",
            PipelineError::Upload(_) => "upload",
            PipelineError::MissingUrl => "missing_url",
            PipelineError::Detection(_) => "detection",
        }
    }
}

/// Stateless orchestrator over a file host and an object detector.
#[derive(Clone)]
pub struct DetectionPipeline {
    host: Arc<dyn FileHost>,
    detector: Arc<dyn ObjectDetector>,
    url_policy: AssetUrlPolicy,
}

impl DetectionPipeline {
    pub fn new(
        host: Arc<dyn FileHost>,
        detector: Arc<dyn ObjectDetector>,
        url_policy: AssetUrlPolicy,
    ) -> Self {
        Self {
            host,
            detector,
            url_policy,
        }
    }

    pub fn host(&self) -> &Arc<dyn FileHost> {
        &self.host
    }

    pub fn detector(&self) -> &Arc<dyn ObjectDetector> {
        &self.detector
    }

    /// Fail before any network call if hosting secrets are missing.
    pub fn ensure_configured(&self) -> Result<(), PipelineError> {
        self.host.check_credentials().map_err(PipelineError::Config)
    }

    /// Run every stage, starting with the configuration check.
    pub async fn run(&self, files: Vec<UploadedFile>) -> Result<DetectResponse, PipelineError> {
        self.ensure_configured()?;
        self.process(files).await
    }

    /// Upload, detect and aggregate. Assumes [`Self::ensure_configured`]
    /// already passed.
    pub async fn process(&self, files: Vec<UploadedFile>) -> Result<DetectResponse, PipelineError> {
        if files.len() > 1 {
            warn!(files = files.len(), "Multiple files submitted; only the first URL is used");
        }

        let url = self.upload(files).await?;
        info!(url = %url, "Image hosted");

        let start = Instant::now();
        let detections = self.detector.detect(&url).await?;
        metrics::record_detection_duration(start.elapsed().as_secs_f64());
        debug!(detections = detections.len(), "Detection finished");

        let label = count_labels(&detections);
        metrics::record_labels_counted(label.total());

        Ok(DetectResponse { url, label })
    }

    /// Upload all files and return the first result's URL.
    async fn upload(&self, files: Vec<UploadedFile>) -> Result<String, PipelineError> {
        let start = Instant::now();
        let results = self
            .host
            .upload_files(files)
            .await
            .map_err(PipelineError::Upload)?;
        metrics::record_upload_duration(start.elapsed().as_secs_f64());

        let first = results.into_iter().next().ok_or(PipelineError::MissingUrl)?;

        if let Some(err) = &first.error {
            warn!(code = %err.code, "Hosting service rejected file: {}", err.message);
        }

        let url = first.url().ok_or(PipelineError::MissingUrl)?.to_string();

        if let Err(reason) = self.url_policy.check(&url) {
            warn!(url = %url, "Unusable upload URL: {}", reason);
            return Err(PipelineError::MissingUrl);
        }

        Ok(url)
    }
}
