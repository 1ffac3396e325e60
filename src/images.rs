//! Hosted product images. Cleanup after a product change is best-effort:
//! failures are logged and never surfaced to the caller.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImageStoreError {
    #[error("image store request failed: {0}")]
    Request(String),
}

/// Deletes uploaded image assets from the file host.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn delete_files(&self, uris: &[String]) -> Result<(), ImageStoreError>;
}

/// Image store for deployments without a file host; only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopImageStore;

#[async_trait]
impl ImageStore for NoopImageStore {
    async fn delete_files(&self, uris: &[String]) -> Result<(), ImageStoreError> {
        debug!(count = uris.len(), "No image store configured, skipping delete");
        Ok(())
    }
}

pub(crate) async fn delete_best_effort(store: &dyn ImageStore, uris: &[String]) {
    if uris.is_empty() {
        return;
    }
    match store.delete_files(uris).await {
        Ok(()) => debug!(count = uris.len(), "Deleted orphaned images"),
        Err(e) => warn!(error = %e, count = uris.len(), "Image cleanup failed"),
    }
}
