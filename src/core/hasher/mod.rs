//! # Hasher Module
//!
//! Fingerprints file content for exact-duplicate detection.
//!
//! ## How It Works
//! 1. Open the file and read it in 1 MiB chunks
//! 2. Feed each chunk to SHA-256 (the whole file is never held in memory)
//! 3. Return the lowercase hex digest together with the byte count
//!
//! Only exact content matches are found. Re-encoded or resized copies of a
//! photo produce different fingerprints.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup_organizer::core::hasher::{ContentHasher, Sha256Hasher};
//!
//! let key = Sha256Hasher::new().fingerprint(&path)?;
//! println!("{} ({} bytes)", key.digest, key.size);
//! ```

mod sha256;
mod traits;

pub use sha256::{Sha256Hasher, CHUNK_SIZE};
pub use traits::{ContentHasher, FingerprintKey};
