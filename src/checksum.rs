//! Fingerprints for built schema maps
//!
//! Two builds from the same registry, country code and custom fields produce
//! the same fingerprint. Callers that rebuild on region or custom-field
//! changes can compare fingerprints instead of walking both maps.

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::SchemaMap;

/// SHA256 checksum, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Fingerprint of a map's schemas and region; the build time is ignored
    pub fn of_schema_map(map: &SchemaMap) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(map.country_code().as_bytes());
        for (name, schema) in map.iter() {
            hasher.update(name.as_bytes());
            let canonical = serde_json::to_vec(schema).unwrap_or_default();
            hasher.update(&canonical);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First twelve hex digits, for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SchemaMap {
    pub fn fingerprint(&self) -> Checksum {
        Checksum::of_schema_map(self)
    }
}
