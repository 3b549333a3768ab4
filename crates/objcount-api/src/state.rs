//! Application state.

use std::sync::Arc;

use objcount_hosting::{FileHost, UploadThingClient};
use objcount_ml_client::{DetectionClient, ObjectDetector};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::pipeline::DetectionPipeline;
use crate::security::AssetUrlPolicy;

/// Shared application state.
///
/// Read-only after startup; requests share nothing mutable through it.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<DetectionPipeline>,
}

impl AppState {
    /// Create new application state with the UploadThing and detection
    /// clients configured from the environment.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let host = UploadThingClient::from_env()?;
        if !host.config().has_credentials() {
            warn!("UPLOADTHING_SECRET or UPLOADTHING_APP_ID not set; detection requests will fail");
        }

        let detector = DetectionClient::from_env()?;
        info!(
            "Detection model {} at {}",
            detector.config().model,
            detector.config().base_url
        );

        Ok(Self::with_collaborators(config, Arc::new(host), Arc::new(detector)))
    }

    /// Create state around explicit collaborators.
    pub fn with_collaborators(
        config: ApiConfig,
        host: Arc<dyn FileHost>,
        detector: Arc<dyn ObjectDetector>,
    ) -> Self {
        let policy = AssetUrlPolicy::new(&config.asset_allowed_hosts);
        let pipeline = DetectionPipeline::new(host, detector, policy);

        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }
}
