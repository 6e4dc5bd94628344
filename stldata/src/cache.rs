//! Integrity-checked JSON envelope for reusing an extracted property set
//! across runs. Reading and writing the file is left to the caller.

use crate::set::PropertySet;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache corrupted: data hash {found} does not match recorded {expected}")]
    Corrupted { expected: String, found: String },
    #[error("Cache stale: source files changed since it was written")]
    Stale,
}

/// A property set plus what is needed to decide whether it can be trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedProperties {
    /// SHA256 over the source texts the set was extracted from.
    pub source_fingerprint: [u8; 32],
    /// SHA256 of the serialized property set.
    pub data_hash: [u8; 32],
    pub generated_at: SystemTime,
    pub properties: PropertySet,
}

impl CachedProperties {
    pub fn new(properties: PropertySet, source_fingerprint: [u8; 32]) -> Result<Self, CacheError> {
        let data_hash = compute_sha256_bytes(serde_json::to_string(&properties)?.as_bytes());
        Ok(CachedProperties {
            source_fingerprint,
            data_hash,
            generated_at: SystemTime::now(),
            properties,
        })
    }

    pub fn to_json(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope and verifies it.
    ///
    /// The data hash is always checked. When `current_fingerprint` is given it
    /// must match the recorded one, otherwise the cache is [`CacheError::Stale`].
    pub fn load(json: &str, current_fingerprint: Option<&[u8; 32]>) -> Result<PropertySet, CacheError> {
        let cached: CachedProperties = serde_json::from_str(json)?;

        let found = compute_sha256_bytes(serde_json::to_string(&cached.properties)?.as_bytes());
        if found != cached.data_hash {
            return Err(CacheError::Corrupted {
                expected: to_hex(&cached.data_hash),
                found: to_hex(&found),
            });
        }

        if current_fingerprint.is_some_and(|current| current != &cached.source_fingerprint) {
            return Err(CacheError::Stale);
        }

        log::debug!(
            "Loaded {} cached properties (generated {:?})",
            cached.properties.len(),
            cached.generated_at
        );
        Ok(cached.properties)
    }
}

/// Fingerprints an ordered list of source texts.
///
/// Each text is length-prefixed so that moving bytes across a file boundary
/// changes the result.
pub fn fingerprint_sources<S: AsRef<str>>(sources: &[S]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for source in sources {
        let bytes = source.as_ref().as_bytes();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().into()
}

fn compute_sha256_bytes(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Details, Property};
    use crate::set::EthicVariants;

    fn sample() -> PropertySet {
        PropertySet::new(
            vec![
                Property::new("auth_x", 1, Details::Authority),
                Property::new("civic_a", 1, Details::Civics),
            ],
            EthicVariants::default(),
        )
    }

    #[test]
    fn test_round_trip() {
        let fp = fingerprint_sources(&["auth_x = { }"]);
        let json = CachedProperties::new(sample(), fp).unwrap().to_json().unwrap();
        let loaded = CachedProperties::load(&json, Some(&fp)).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("civic_a"));
    }

    #[test]
    fn test_stale_fingerprint() {
        let fp = fingerprint_sources(&["auth_x = { }"]);
        let json = CachedProperties::new(sample(), fp).unwrap().to_json().unwrap();
        let changed = fingerprint_sources(&["auth_y = { }"]);
        assert!(matches!(
            CachedProperties::load(&json, Some(&changed)),
            Err(CacheError::Stale)
        ));
        // without a current fingerprint only integrity is checked
        assert!(CachedProperties::load(&json, None).is_ok());
    }

    #[test]
    fn test_tampered_data_is_corrupted() {
        let fp = fingerprint_sources(&["x"]);
        let json = CachedProperties::new(sample(), fp).unwrap().to_json().unwrap();
        let tampered = json.replace("civic_a", "civic_b");
        assert!(matches!(
            CachedProperties::load(&tampered, None),
            Err(CacheError::Corrupted { .. })
        ));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            CachedProperties::load("{ not json", None),
            Err(CacheError::Serialization(_))
        ));
    }

    #[test]
    fn test_fingerprint_respects_boundaries() {
        assert_ne!(fingerprint_sources(&["ab", "c"]), fingerprint_sources(&["a", "bc"]));
        assert_eq!(fingerprint_sources(&["a", "b"]), fingerprint_sources(&["a", "b"]));
    }
}
