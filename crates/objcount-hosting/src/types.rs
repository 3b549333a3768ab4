//! UploadThing request/response types.

use std::collections::HashMap;

use objcount_models::HostedAsset;
use serde::{Deserialize, Serialize};

/// Outcome of uploading one file.
///
/// Exactly one of `data` and `error` is set by [`UploadResult::ok`] and
/// [`UploadResult::failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub data: Option<HostedAsset>,
    pub error: Option<UploadFileError>,
}

impl UploadResult {
    pub fn ok(asset: HostedAsset) -> Self {
        Self {
            data: Some(asset),
            error: None,
        }
    }

    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(UploadFileError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }

    /// URL of the hosted file, if the upload succeeded with a non-empty URL.
    pub fn url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .filter(|asset| asset.has_url())
            .map(|asset| asset.url.as_str())
    }
}

/// Per-file upload failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileError {
    pub code: String,
    pub message: String,
}

/// File description sent when requesting presigned uploads.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FileDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Body of `POST /v6/uploadFiles`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrepareUploadRequest {
    pub files: Vec<FileDescriptor>,
    pub acl: &'static str,
    pub content_disposition: &'static str,
}

/// Response of `POST /v6/uploadFiles`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PrepareUploadResponse {
    pub data: Vec<PresignedUpload>,
}

/// Presigned destination for a single file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresignedUpload {
    /// Host-assigned file key
    pub key: String,
    /// Public URL the file will be served from
    #[serde(default)]
    pub file_url: Option<String>,
    /// Presigned POST target for the bytes
    pub url: String,
    /// Form fields that must accompany the bytes
    #[serde(default)]
    pub fields: HashMap<String, String>,
}
