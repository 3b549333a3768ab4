//! UploadThing client implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use objcount_models::{HostedAsset, UploadedFile};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{HostingError, HostingResult};
use crate::host::FileHost;
use crate::types::{
    FileDescriptor, PrepareUploadRequest, PrepareUploadResponse, PresignedUpload, UploadResult,
};

/// API version advertised to UploadThing.
const UPLOADTHING_VERSION: &str = "6.4.0";

/// Public file CDN used when the API omits `fileUrl`.
const FILE_CDN_BASE: &str = "https://utfs.io/f";

/// Configuration for the UploadThing client.
#[derive(Clone)]
pub struct UploadThingConfig {
    /// UploadThing REST API base URL
    pub api_url: String,
    /// Secret API key (`UPLOADTHING_SECRET`)
    pub secret: Option<String>,
    /// Application identifier (`UPLOADTHING_APP_ID`)
    pub app_id: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for UploadThingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadThingConfig")
            .field("api_url", &self.api_url)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("app_id", &self.app_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for UploadThingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.uploadthing.com".to_string(),
            secret: None,
            app_id: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl UploadThingConfig {
    /// Create config from environment variables.
    ///
    /// Missing secrets are not an error here; they are reported per request
    /// by [`FileHost::check_credentials`].
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("UPLOADTHING_API_URL")
                .unwrap_or_else(|_| "https://api.uploadthing.com".to_string()),
            secret: non_empty_env("UPLOADTHING_SECRET"),
            app_id: non_empty_env("UPLOADTHING_APP_ID"),
            timeout: Duration::from_secs(
                std::env::var("UPLOADTHING_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Both secrets are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        self.secret.is_some() && self.app_id.is_some()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// UploadThing REST client.
#[derive(Clone)]
pub struct UploadThingClient {
    http: Client,
    config: UploadThingConfig,
}

impl UploadThingClient {
    /// Create a new client from configuration.
    pub fn new(config: UploadThingConfig) -> HostingResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HostingError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> HostingResult<Self> {
        Self::new(UploadThingConfig::from_env())
    }

    pub fn config(&self) -> &UploadThingConfig {
        &self.config
    }

    fn credentials(&self) -> HostingResult<(&str, &str)> {
        match (&self.config.secret, &self.config.app_id) {
            (Some(secret), Some(app_id)) => Ok((secret.as_str(), app_id.as_str())),
            _ => Err(HostingError::MissingCredentials),
        }
    }

    /// Request presigned upload targets for the given files.
    async fn prepare_upload(&self, files: &[UploadedFile]) -> HostingResult<Vec<PresignedUpload>> {
        let (secret, app_id) = self.credentials()?;
        let url = format!("{}/v6/uploadFiles", self.config.api_url.trim_end_matches('/'));

        let body = PrepareUploadRequest {
            files: files
                .iter()
                .map(|f| FileDescriptor {
                    name: f.name.clone(),
                    size: f.size(),
                    content_type: f.content_type.clone(),
                })
                .collect(),
            acl: "public-read",
            content_disposition: "inline",
        };

        debug!("Requesting {} presigned uploads from {}", files.len(), url);

        let response = self
            .http
            .post(&url)
            .header("x-uploadthing-api-key", secret)
            .header("x-uploadthing-app-id", app_id)
            .header("x-uploadthing-version", UPLOADTHING_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostingError::from_http_status(status.as_u16(), body));
        }

        let prepared: PrepareUploadResponse = response.json().await?;
        if prepared.data.len() != files.len() {
            return Err(HostingError::invalid_response(format!(
                "expected {} presigned uploads, got {}",
                files.len(),
                prepared.data.len()
            )));
        }

        Ok(prepared.data)
    }

    /// Send one file's bytes to its presigned target.
    async fn upload_one(&self, file: UploadedFile, presigned: PresignedUpload) -> UploadResult {
        let size = file.size();
        let name = file.name.clone();

        let mut form = Form::new();
        for (key, value) in presigned.fields {
            form = form.text(key, value);
        }

        let part = match Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.content_type)
        {
            Ok(part) => part,
            Err(e) => return UploadResult::failed("BAD_REQUEST", format!("Invalid media type: {}", e)),
        };
        form = form.part("file", part);

        let outcome = self.http.post(&presigned.url).multipart(form).send().await;

        match outcome {
            Ok(response) if response.status().is_success() => {
                let url = presigned
                    .file_url
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| format!("{}/{}", FILE_CDN_BASE, presigned.key));
                info!("Uploaded {} ({} bytes) to {}", name, size, url);
                UploadResult::ok(HostedAsset {
                    key: presigned.key,
                    url,
                    name,
                    size,
                })
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("Upload of {} rejected with {}: {}", name, status, body);
                UploadResult::failed("UPLOAD_FAILED", format!("{} returned {}", name, status))
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", name, e);
                UploadResult::failed("UPLOAD_FAILED", e.to_string())
            }
        }
    }
}

#[async_trait]
impl FileHost for UploadThingClient {
    fn check_credentials(&self) -> HostingResult<()> {
        self.credentials().map(|_| ())
    }

    async fn upload_files(&self, files: Vec<UploadedFile>) -> HostingResult<Vec<UploadResult>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let span = info_span!("uploadthing_upload", files = files.len());
        async move {
            let start = Instant::now();
            let presigned = self.prepare_upload(&files).await?;

            let mut results = Vec::with_capacity(files.len());
            for (file, target) in files.into_iter().zip(presigned) {
                results.push(self.upload_one(file, target).await);
            }

            debug!("Upload batch finished in {:?}", start.elapsed());
            Ok::<_, HostingError>(results)
        }
        .instrument(span)
        .await
    }
}
