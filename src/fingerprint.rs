//! Schema fingerprints for validator cache identity

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 fingerprint of a schema document's serialized form
///
/// Identity is textual, not semantic: two schemas that differ only in key
/// order produce different fingerprints and occupy separate cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaFingerprint(String);

impl SchemaFingerprint {
    /// Compute a fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute a fingerprint from a JSON schema document
    pub fn from_json(value: &Value) -> Self {
        let serialized = serde_json::to_string(value).unwrap_or_default();
        Self::from_bytes(serialized.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaFingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
