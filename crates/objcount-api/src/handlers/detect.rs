//! Object detection endpoint.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use objcount_models::{DetectResponse, UploadedFile, DEFAULT_CONTENT_TYPE};
use tracing::debug;

use crate::error::ApiResult;
use crate::pipeline::PipelineError;
use crate::state::AppState;

/// Multipart field carrying the uploaded files.
pub const FILES_FIELD: &str = "files";

/// Upload an image, run detection on its hosted URL and count labels.
///
/// Secrets are checked before the body is read. Any failure, including a
/// malformed body, becomes a 500 with `{error, details}`.
pub async fn detect_objects(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<DetectResponse>> {
    state.pipeline.ensure_configured()?;

    let multipart = multipart.map_err(|e| PipelineError::form(e.body_text()))?;
    let files = collect_files(multipart).await?;
    debug!(files = files.len(), "Received upload");

    let response = state.pipeline.process(files).await?;
    Ok(Json(response))
}

/// Read every `files` part, in submission order.
async fn collect_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, PipelineError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::form(format!("Multipart error: {}", e.body_text())))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| PipelineError::form(format!("Failed to read {}: {}", name, e.body_text())))?;

        files.push(UploadedFile::new(name, content_type, bytes.to_vec()));
    }

    Ok(files)
}
