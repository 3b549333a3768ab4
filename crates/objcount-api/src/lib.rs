//! Axum HTTP server for image upload and object counting.
//!
//! This crate provides:
//! - `POST /api/detect-objects`: upload an image, run detection, count labels
//! - The single-page upload form served at `/`
//! - Health/readiness probes, CORS, security headers, rate limiting
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use pipeline::{DetectionPipeline, PipelineError};
pub use routes::create_router;
pub use state::AppState;
