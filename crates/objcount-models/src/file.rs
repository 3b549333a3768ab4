//! Uploaded files and the hosted references they turn into.

use serde::{Deserialize, Serialize};

/// Fallback media type when the client does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file received from the client, held in memory until it is uploaded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as declared by the client
    pub name: String,
    /// Declared media type
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Durable reference to a file stored by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedAsset {
    /// Host-assigned file key
    pub key: String,
    /// Public URL of the stored bytes
    pub url: String,
    /// Original file name
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl HostedAsset {
    /// True if the asset carries a URL that can be handed to the detector.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
