//! Client for the hosted object-detection model runtime.
//!
//! The runtime is addressed through the [`ObjectDetector`] capability: given a
//! fetchable image URL it returns the model's detections. [`DetectionClient`]
//! implements it against a Hugging Face Inference API compatible service.

pub mod client;
pub mod detector;
pub mod error;
pub mod types;

pub use client::{DetectionClient, DetectionClientConfig, DEFAULT_MODEL};
pub use detector::ObjectDetector;
pub use error::{MlError, MlResult};
