//! Document repository trait.

use async_trait::async_trait;
use serde_json::Value;

use super::error::RepositoryResult;
use crate::db::models::UploadSummary;

/// A single full-replace collection of schema-less JSON documents.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so they can be shared behind an `Arc`.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Clear the collection and insert `documents` in order.
    ///
    /// # Returns
    /// * `Ok(UploadSummary)` - Count and checksum of the stored batch
    /// * `Err(RepositoryError)` - If the store rejected the batch; the previous
    ///   contents may already be gone
    async fn replace_all(&self, documents: Vec<Value>) -> RepositoryResult<UploadSummary>;

    /// Every stored document, in insertion order.
    async fn fetch_all(&self) -> RepositoryResult<Vec<Value>>;

    async fn count(&self) -> RepositoryResult<usize>;

    /// Release the underlying resources. Further calls may fail.
    async fn close(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
