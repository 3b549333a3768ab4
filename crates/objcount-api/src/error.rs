//! API error types.
//!
//! Every server-side failure maps to the same response shape:
//! `500 {"error": "Internal Server Error", "details": <message>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use objcount_models::ErrorBody;
use thiserror::Error;
use tracing::error;

use crate::metrics;
use crate::pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    fn stage(&self) -> &'static str {
        match self {
            ApiError::Pipeline(e) => e.stage(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let stage = self.stage();
        error!(stage = stage, "Error in POST /api/detect-objects: {}", self);
        metrics::record_pipeline_failure(stage);

        let body = ErrorBody::internal(self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
