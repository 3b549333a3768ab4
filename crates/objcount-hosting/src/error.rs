//! Hosting error types.

use thiserror::Error;

/// Result type for hosting operations.
pub type HostingResult<T> = Result<T, HostingError>;

/// Errors that can occur while talking to the hosting service.
#[derive(Debug, Error)]
pub enum HostingError {
    #[error("Missing API key or app ID.")]
    MissingCredentials,

    #[error("Upload request failed: {0}")]
    RequestFailed(String),

    #[error("Hosting service error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HostingError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if status >= 500 {
            Self::ServerError(status, body)
        } else {
            Self::RequestFailed(format!("status {}: {}", status, body))
        }
    }

    /// HTTP status reported by the hosting service, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            HostingError::ServerError(status, _) => Some(*status),
            HostingError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
