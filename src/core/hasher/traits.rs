//! Trait definitions for content fingerprinting.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The equality criterion for "is a duplicate of": digest plus length.
///
/// Two files with the same key are treated as byte-identical. That rests on
/// SHA-256 collisions being negligible; it is an assumption, not a check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintKey {
    /// Lowercase hex digest of the full content
    pub digest: String,
    /// Number of bytes that went through the digest
    pub size: u64,
}

impl FingerprintKey {
    /// Short form of the digest for logs
    pub fn short(&self) -> &str {
        &self.digest[..self.digest.len().min(12)]
    }
}

impl std::fmt::Display for FingerprintKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.digest, self.size)
    }
}

/// Computes a content fingerprint for a file.
///
/// Implement this trait to swap in another digest, or to inject failures in
/// tests.
pub trait ContentHasher: Send + Sync {
    /// Stream the file through the digest
    fn fingerprint(&self, path: &Path) -> Result<FingerprintKey, HashError>;

    /// Name of the digest algorithm
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_digest_and_size() {
        let key = FingerprintKey {
            digest: "ab12".to_string(),
            size: 7,
        };
        assert_eq!(key.to_string(), "ab12|7");
    }

    #[test]
    fn short_form_is_a_digest_prefix() {
        let key = FingerprintKey {
            digest: "2cf24dba5fb0a30e26e83b2ac5b9e29e".to_string(),
            size: 5,
        };
        assert_eq!(key.short(), "2cf24dba5fb0");

        let tiny = FingerprintKey {
            digest: "ab".to_string(),
            size: 0,
        };
        assert_eq!(tiny.short(), "ab");
    }

    #[test]
    fn same_digest_different_size_is_a_different_key() {
        let a = FingerprintKey {
            digest: "00ff".to_string(),
            size: 1,
        };
        let b = FingerprintKey {
            digest: "00ff".to_string(),
            size: 2,
        };
        assert_ne!(a, b);
    }
}
