//! Model runtime response types.

use objcount_models::Detection;
use serde::Deserialize;

/// Body returned by the inference endpoint.
///
/// Success is a bare array of detections; failures are an object with an
/// `error` message and, while the model is loading, an `estimated_time`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse {
    Detections(Vec<Detection>),
    Error(InferenceError),
}

/// Error object returned by the inference endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceError {
    pub error: String,
    #[serde(default)]
    pub estimated_time: Option<f64>,
}
