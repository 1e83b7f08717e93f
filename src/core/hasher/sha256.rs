//! Streaming SHA-256 over file content.

use super::{ContentHasher, FingerprintKey};
use crate::error::HashError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read size per syscall. Large enough to amortize I/O on big videos.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// SHA-256 content hasher
#[derive(Debug, Clone)]
pub struct Sha256Hasher {
    chunk_size: usize,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Use a different read size (minimum 4 KiB)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(4096);
        self
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Sha256Hasher {
    fn fingerprint(&self, path: &Path) -> Result<FingerprintKey, HashError> {
        let mut file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut size = 0u64;

        loop {
            let bytes_read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HashError::Read {
                        path: path.to_path_buf(),
                        bytes_read: size,
                        source,
                    })
                }
            };

            hasher.update(&buffer[..bytes_read]);
            size += bytes_read as u64;
        }

        Ok(FingerprintKey {
            digest: hex::encode(hasher.finalize()),
            size,
        })
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}
