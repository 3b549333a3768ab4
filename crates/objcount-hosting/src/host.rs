//! File hosting capability.

use async_trait::async_trait;
use objcount_models::UploadedFile;

use crate::error::HostingResult;
use crate::types::UploadResult;

/// Something that stores files and hands back durable public URLs.
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Fail fast if the host cannot be used (e.g. missing credentials).
    /// Must not touch the network.
    fn check_credentials(&self) -> HostingResult<()>;

    /// Upload files in one call, returning one result per file in
    /// submission order.
    async fn upload_files(&self, files: Vec<UploadedFile>) -> HostingResult<Vec<UploadResult>>;
}
