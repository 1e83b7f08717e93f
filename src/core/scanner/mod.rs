//! # Scanner Module
//!
//! Discovers media files under a source folder.
//!
//! ## Recognized Formats
//! - Photos: jpg, jpeg, png, bmp, gif, tiff, heic, heif
//! - Videos: mp4, avi, mov, wmv, mkv, m4v
//!
//! The list is only a default; [`ScanConfig::extensions`] replaces it.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup_organizer::core::scanner::{MediaScanner, ScanConfig};
//!
//! let scanner = MediaScanner::new(ScanConfig::default());
//! for file in scanner.walk(Path::new("/Users/me/Pictures")).flatten() {
//!     println!("{}", file.path.display());
//! }
//! ```

mod filter;
mod walker;

pub use filter::{normalize_extension, MediaFilter, DEFAULT_MEDIA_EXTENSIONS};
pub use walker::{MediaScanner, ScanConfig};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// A media file discovered by the scanner.
///
/// Identified by its path; size, fingerprint and capture date are looked up
/// later, when a phase needs them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaFile {
    /// Absolute path to the file
    pub path: PathBuf,
}

impl MediaFile {
    /// Wrap a path, making it absolute against the working directory
    pub fn new(path: PathBuf) -> Self {
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&path))
                .unwrap_or(path)
        };
        Self { path }
    }

    /// Current size on disk
    pub fn size(&self) -> io::Result<u64> {
        std::fs::metadata(&self.path).map(|m| m.len())
    }

    /// File name for progress display
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files found
    pub files: Vec<MediaFile>,
    /// Entries that were skipped (non-fatal)
    pub errors: Vec<ScanError>,
}
