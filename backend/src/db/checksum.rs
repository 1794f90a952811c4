//! Checksums identifying an uploaded batch.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
