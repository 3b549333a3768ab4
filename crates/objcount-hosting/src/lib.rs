//! UploadThing file hosting client.
//!
//! This crate provides:
//! - The [`FileHost`] capability used by the detection pipeline
//! - An UploadThing REST implementation ([`UploadThingClient`])
//! - Per-file upload results mirroring the hosting API

pub mod client;
pub mod error;
pub mod host;
pub mod types;

pub use client::{UploadThingClient, UploadThingConfig};
pub use error::{HostingError, HostingResult};
pub use host::FileHost;
pub use types::{UploadFileError, UploadResult};
