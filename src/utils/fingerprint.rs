use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Content fingerprint of a generation run's output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputFingerprint {
    /// FHIR package version the output was resolved from (e.g., "4.0.1")
    pub version: String,
    /// Target the output was resolved for
    pub target: String,
    /// SHA-256 hash of the canonical JSON serialization
    pub content_hash: String,
}

impl OutputFingerprint {
    pub fn new(version: String, target: String, content_hash: String) -> Self {
        Self {
            version,
            target,
            content_hash,
        }
    }

    /// Check if this fingerprint matches another
    pub fn matches(&self, other: &OutputFingerprint) -> bool {
        self.version == other.version
            && self.target == other.target
            && self.content_hash == other.content_hash
    }

    /// Get a short representation of the fingerprint for logging
    pub fn short_hash(&self) -> &str {
        self.content_hash
            .get(..8)
            .unwrap_or(&self.content_hash)
    }
}

/// SHA-256 hex digest of raw bytes.
pub fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 hex digest of a value's JSON serialization. Only stable for
/// values whose maps serialize in a fixed order.
pub fn json_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    Ok(content_hash(&bytes))
}
