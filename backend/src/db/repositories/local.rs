//! In-memory document store.
//!
//! Used by tests and local development. Data lives for as long as the last
//! clone of the repository handle.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::models::UploadSummary;
use crate::db::repository::{DocumentRepository, RepositoryError, RepositoryResult};

/// In-memory implementation of [`DocumentRepository`].
///
/// # Example
/// ```ignore
/// use dab_rust::db::repositories::LocalRepository;
/// use dab_rust::db::repository::DocumentRepository;
///
/// let repo = LocalRepository::new();
/// repo.replace_all(vec![serde_json::json!({"id": "1"})]).await?;
/// assert_eq!(repo.count().await?, 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    documents: Vec<Value>,
    last_upload: Option<UploadSummary>,
    is_healthy: bool,
    closed: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            last_upload: None,
            is_healthy: true,
            closed: false,
        }
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Simulate the store becoming unreachable.
    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut data) = self.data.write() {
            data.is_healthy = healthy;
        }
    }

    /// Drop every document, keeping the health flag.
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.write() {
            data.documents.clear();
            data.last_upload = None;
        }
    }

    /// Summary of the most recent upload, if any.
    pub fn last_upload(&self) -> Option<UploadSummary> {
        self.data.read().ok().and_then(|d| d.last_upload.clone())
    }

    fn read(&self, operation: &str) -> RepositoryResult<RwLockReadGuard<'_, LocalData>> {
        let data = self.data.read().map_err(|_| poisoned(operation))?;
        check_available(&data, operation)?;
        Ok(data)
    }

    fn write(&self, operation: &str) -> RepositoryResult<RwLockWriteGuard<'_, LocalData>> {
        let data = self.data.write().map_err(|_| poisoned(operation))?;
        check_available(&data, operation)?;
        Ok(data)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

const MEMORY_LOCATION: &str = "memory";

fn poisoned(operation: &str) -> RepositoryError {
    RepositoryError::internal("in-memory store lock poisoned")
        .during(operation)
        .at(MEMORY_LOCATION)
}

fn check_available(data: &LocalData, operation: &str) -> RepositoryResult<()> {
    if data.closed {
        return Err(RepositoryError::unavailable("repository has been closed")
            .during(operation)
            .at(MEMORY_LOCATION));
    }
    if !data.is_healthy {
        return Err(RepositoryError::unavailable("in-memory store marked unhealthy")
            .during(operation)
            .at(MEMORY_LOCATION));
    }
    Ok(())
}

#[async_trait]
impl DocumentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().map_err(|_| poisoned("health_check"))?;
        Ok(data.is_healthy && !data.closed)
    }

    async fn replace_all(&self, documents: Vec<Value>) -> RepositoryResult<UploadSummary> {
        let mut data = self.write("replace_all")?;
        let summary = UploadSummary::for_batch(&documents);
        data.documents = documents;
        data.last_upload = Some(summary.clone());
        Ok(summary)
    }

    async fn fetch_all(&self) -> RepositoryResult<Vec<Value>> {
        Ok(self.read("fetch_all")?.documents.clone())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.read("count")?.documents.len())
    }

    async fn close(&self) -> RepositoryResult<()> {
        let mut data = self.data.write().map_err(|_| poisoned("close"))?;
        data.closed = true;
        Ok(())
    }
}
