//! Store-level data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::checksum::calculate_checksum;

/// Outcome of a full-replace upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Number of documents now in the collection
    pub documents_written: usize,
    /// SHA-256 of the serialised batch
    pub checksum: String,
    pub replaced_at: DateTime<Utc>,
}

impl UploadSummary {
    pub fn for_batch(documents: &[Value]) -> Self {
        Self {
            documents_written: documents.len(),
            checksum: batch_checksum(documents),
            replaced_at: Utc::now(),
        }
    }
}

/// Checksum over the compact JSON encoding of a batch.
pub fn batch_checksum(documents: &[Value]) -> String {
    let encoded = Value::Array(documents.to_vec()).to_string();
    calculate_checksum(&encoded)
}
