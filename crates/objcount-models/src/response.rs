//! Response payloads of the detection endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::LabelCounts;

/// Generic error tag carried by every failure response.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Successful detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectResponse {
    /// Hosted URL of the uploaded image
    pub url: String,
    /// Count of confident detections per label
    pub label: LabelCounts,
}

/// Failure body. Pipeline failures pair it with a 500 status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(INTERNAL_SERVER_ERROR, details)
    }
}
