//! Service layer over [`DocumentRepository`].
//!
//! These functions are the entry points the CLI and HTTP handlers use; they
//! work with any repository implementation.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use super::documents::serialize_records;
use super::models::UploadSummary;
use super::repository::{DocumentRepository, RepositoryError, RepositoryResult};
use super::schema::{records_from_documents, SchemaValidationError};
use crate::models::OutputRecord;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a JSON array of documents: {message}", path.display())]
    InvalidFile { path: PathBuf, message: String },
}

/// Serialise records and replace the collection with them.
pub async fn upload_records(
    repo: &dyn DocumentRepository,
    records: &[OutputRecord],
) -> Result<UploadSummary, DocumentError> {
    let documents = serialize_records(records).map_err(RepositoryError::from)?;
    let summary = repo.replace_all(documents).await?;
    info!(
        "Uploaded {} documents (checksum {})",
        summary.documents_written, summary.checksum
    );
    Ok(summary)
}

/// Replace the collection with already-formatted documents.
///
/// The whole batch is schema-checked first; a non-conforming document leaves the
/// store untouched.
pub async fn upload_documents(
    repo: &dyn DocumentRepository,
    documents: Vec<Value>,
) -> Result<UploadSummary, DocumentError> {
    records_from_documents(&documents)?;
    let summary = repo.replace_all(documents).await?;
    info!("Uploaded {} pre-formatted documents", summary.documents_written);
    Ok(summary)
}

/// Read a JSON array of documents from disk.
pub async fn load_documents_file(path: &Path) -> Result<Vec<Value>, DocumentError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let invalid = |message: String| DocumentError::InvalidFile {
        path: path.to_path_buf(),
        message,
    };
    match serde_json::from_str::<Value>(&content).map_err(|e| invalid(e.to_string()))? {
        Value::Array(documents) => Ok(documents),
        other => Err(invalid(format!("top-level value is {}", json_kind(&other)))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetch every stored document, check it against the output contract and
/// convert it back to a typed record.
pub async fn fetch_output_records(
    repo: &dyn DocumentRepository,
) -> Result<Vec<OutputRecord>, DocumentError> {
    let documents = repo.fetch_all().await?;
    let records = records_from_documents(&documents).map_err(|e| {
        warn!("Stored document failed schema check: {}", e);
        e
    })?;
    Ok(records)
}

/// Write the whole collection to `path` as a pretty-printed JSON array.
/// Returns the number of documents written.
pub async fn dump_documents(
    repo: &dyn DocumentRepository,
    path: &Path,
) -> Result<usize, DocumentError> {
    let documents = repo.fetch_all().await?;
    let encoded = serde_json::to_vec_pretty(&documents).map_err(RepositoryError::from)?;

    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    }
    tokio::fs::write(path, encoded).await.map_err(io_err)?;

    info!("Dumped {} documents to {}", documents.len(), path.display());
    Ok(documents.len())
}

pub async fn health_check(repo: &dyn DocumentRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
