//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Only validation aborts** - every per-file failure is recorded in the
//!   run report and processing continues with the next file

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Problems with the run's inputs, detected before anything on disk changes
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Source folder does not exist: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Source is not a folder: {path}")]
    SourceNotDirectory { path: PathBuf },

    #[error("No target folder was specified")]
    TargetUnspecified,

    #[error("Concurrency must be at least 1 (got {value})")]
    InvalidConcurrency { value: usize },

    #[error("At least one media extension must be recognized")]
    NoExtensions,

    #[error("Could not start the hashing worker pool: {reason}")]
    WorkerPool { reason: String },
}

/// Errors for individual entries during directory scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {reason}")]
    ReadEntry { path: PathBuf, reason: String },

    #[error("Symbolic link not followed: {path}")]
    SymlinkNotFollowed { path: PathBuf },
}

impl ScanError {
    /// Path of the entry that was skipped
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::PermissionDenied { path }
            | ScanError::ReadEntry { path, .. }
            | ScanError::SymlinkNotFollowed { path } => path,
        }
    }
}

/// Errors that occur while fingerprinting file content
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed reading {path} after {bytes_read} bytes: {source}")]
    Read {
        path: PathBuf,
        bytes_read: u64,
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Path of the file that could not be hashed
    pub fn path(&self) -> &PathBuf {
        match self {
            HashError::Open { path, .. } | HashError::Read { path, .. } => path,
        }
    }
}

/// Errors while reading an embedded capture date
///
/// These never fail a run; the resolver falls back to filesystem time.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to open {path} for metadata: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable EXIF data in {path}: {reason}")]
    Exif { path: PathBuf, reason: String },

    #[error("Malformed QuickTime header in {path}: {reason}")]
    QuickTime { path: PathBuf, reason: String },

    #[error("No filesystem timestamp available for {path}: {source}")]
    FilesystemTime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while placing a file in the target tree
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to create folder {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {source_path} -> {dest_path}: {source}")]
    Copy {
        source_path: PathBuf,
        dest_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {source_path} -> {dest_path}: {source}")]
    Move {
        source_path: PathBuf,
        dest_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy verification failed for {dest_path}: source {expected} bytes, copy {actual} bytes")]
    Verification {
        dest_path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

/// Errors loading a settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_includes_path() {
        let error = ValidationError::SourceMissing {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn hash_error_reports_path_and_cause() {
        let error = HashError::Open {
            path: PathBuf::from("/photos/locked.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.path(), &PathBuf::from("/photos/locked.jpg"));
        let message = error.to_string();
        assert!(message.contains("/photos/locked.jpg"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn transfer_error_names_both_ends() {
        let error = TransferError::Copy {
            source_path: PathBuf::from("/in/a.jpg"),
            dest_path: PathBuf::from("/out/2020/June/a.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = error.to_string();
        assert!(message.contains("/in/a.jpg"));
        assert!(message.contains("/out/2020/June/a.jpg"));
    }

    #[test]
    fn validation_converts_into_top_level() {
        let error: OrganizerError = ValidationError::TargetUnspecified.into();
        assert!(matches!(error, OrganizerError::Validation(_)));
    }
}
