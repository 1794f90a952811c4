//! JSON-file document store.
//!
//! The collection is one pretty-printed JSON array. Uploads write a sibling
//! temporary file and rename it over the target, so readers never observe a
//! half-written collection.

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;

use crate::db::models::UploadSummary;
use crate::db::repository::{DocumentRepository, RepositoryError, RepositoryResult};

/// Default collection file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/formatted_data.json";

#[derive(Debug)]
pub struct FileRepository {
    path: PathBuf,
    closed: AtomicBool,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attach the operation and the collection file to `err`.
    fn locate(&self, err: RepositoryError, operation: &str) -> RepositoryError {
        err.during(operation).at(self.path.display())
    }

    fn ensure_open(&self, operation: &str) -> RepositoryResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(self.locate(
                RepositoryError::unavailable("repository has been closed"),
                operation,
            ));
        }
        Ok(())
    }

    async fn read_collection(&self, operation: &str) -> RepositoryResult<Vec<Value>> {
        self.ensure_open(operation)?;
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.locate(e.into(), operation)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| self.locate(e.into(), operation))?;
        match value {
            Value::Array(documents) => Ok(documents),
            _ => Err(self.locate(
                RepositoryError::corrupt("collection file does not hold a JSON array"),
                operation,
            )),
        }
    }
}

#[async_trait]
impl DocumentRepository for FileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(false);
        }
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false)
            || fs::create_dir_all(&dir).await.is_ok())
    }

    async fn replace_all(&self, documents: Vec<Value>) -> RepositoryResult<UploadSummary> {
        self.ensure_open("replace_all")?;
        let summary = UploadSummary::for_batch(&documents);

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| self.locate(e.into(), "replace_all"))?;
        }

        let encoded = serde_json::to_vec_pretty(&documents)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &encoded)
            .await
            .map_err(|e| self.locate(e.into(), "replace_all"))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.locate(e.into(), "replace_all"))?;

        info!(
            "Replaced {} with {} documents",
            self.path.display(),
            summary.documents_written
        );
        Ok(summary)
    }

    async fn fetch_all(&self) -> RepositoryResult<Vec<Value>> {
        let documents = self.read_collection("fetch_all").await?;
        debug!("Read {} documents from {}", documents.len(), self.path.display());
        Ok(documents)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.read_collection("count").await?.len())
    }

    async fn close(&self) -> RepositoryResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
