//! Fakes and request builders shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use objcount_api::{create_router, ApiConfig, AppState};
use objcount_hosting::{FileHost, HostingError, HostingResult, UploadResult};
use objcount_ml_client::{MlError, MlResult, ObjectDetector};
use objcount_models::{Detection, HostedAsset, UploadedFile};

pub const BOUNDARY: &str = "objcount-test-boundary";

/// What the fake host does on upload.
#[derive(Clone)]
pub enum HostMode {
    Url(String),
    EmptyUrl,
    Throws,
    NoCredentials,
}

pub struct FakeHost {
    mode: HostMode,
    calls: AtomicUsize,
}

impl FakeHost {
    pub fn new(mode: HostMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn serving(url: &str) -> Arc<Self> {
        Self::new(HostMode::Url(url.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileHost for FakeHost {
    fn check_credentials(&self) -> HostingResult<()> {
        match self.mode {
            HostMode::NoCredentials => Err(HostingError::MissingCredentials),
            _ => Ok(()),
        }
    }

    async fn upload_files(&self, files: Vec<UploadedFile>) -> HostingResult<Vec<UploadResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let asset = |url: &str, file: &UploadedFile| HostedAsset {
            key: "abc123".to_string(),
            url: url.to_string(),
            name: file.name.clone(),
            size: file.size(),
        };

        match &self.mode {
            HostMode::Url(url) => Ok(files.iter().map(|f| UploadResult::ok(asset(url, f))).collect()),
            HostMode::EmptyUrl => Ok(files.iter().map(|f| UploadResult::ok(asset("", f))).collect()),
            HostMode::Throws => Err(HostingError::ServerError(502, "upstream unavailable".to_string())),
            HostMode::NoCredentials => Err(HostingError::MissingCredentials),
        }
    }
}

pub struct FakeDetector {
    detections: Vec<Detection>,
    fail: bool,
    calls: AtomicUsize,
    last_url: std::sync::Mutex<Option<String>>,
}

impl FakeDetector {
    pub fn returning(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            fail: false,
            calls: AtomicUsize::new(0),
            last_url: std::sync::Mutex::new(None),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            detections: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            last_url: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectDetector for FakeDetector {
    async fn detect(&self, image_url: &str) -> MlResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(image_url.to_string());
        if self.fail {
            Err(MlError::ModelLoading("Model facebook/detr-resnet-50 is currently loading".to_string()))
        } else {
            Ok(self.detections.clone())
        }
    }

    async fn health_check(&self) -> MlResult<bool> {
        Ok(!self.fail)
    }
}

pub fn pets() -> Vec<Detection> {
    vec![
        Detection::new("cat", 0.93),
        Detection::new("cat", 0.40),
        Detection::new("dog", 0.99),
    ]
}

pub fn router(host: Arc<FakeHost>, detector: Arc<FakeDetector>) -> Router {
    let state = AppState::with_collaborators(ApiConfig::default(), host, detector);
    create_router(state, None)
}

/// A multipart body with one part per `(field, file name, bytes)`.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn detect_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/detect-objects")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn jpeg_upload() -> Request<Body> {
    detect_request(multipart_body(&[("files", "cat.jpg", &[0xFFu8, 0xD8, 0xFF, 0xE0][..])]))
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
