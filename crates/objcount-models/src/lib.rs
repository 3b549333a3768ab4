//! Shared data models for the objcount service.
//!
//! This crate provides Serde-serializable types for:
//! - Uploaded files and hosted asset references
//! - Detection records returned by the model runtime
//! - Label aggregation and the endpoint's response payloads

pub mod detection;
pub mod file;
pub mod response;

pub use detection::{count_labels, BoundingBox, Detection, LabelCounts, CONFIDENCE_THRESHOLD};
pub use file::{HostedAsset, UploadedFile, DEFAULT_CONTENT_TYPE};
pub use response::{DetectResponse, ErrorBody, INTERNAL_SERVER_ERROR};
