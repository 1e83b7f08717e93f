//! # Reporter Module
//!
//! The structured outcome of one run, and its human and JSON renderings.
//!
//! A [`Report`] is always produced, even when files failed: every per-file
//! problem becomes a [`ReportEntry`] and the run carries on. Only invalid
//! input stops a run before it starts.

mod export;
mod render;

pub use export::{export_json, export_text, export_to_file, ExportFormat};
pub use render::format_bytes;

use crate::core::organize::{DateWarning, OperationMode, TransferFailure};
use crate::error::{HashError, ScanError};
use crate::events::PipelineSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which step a report entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Walking the source tree
    Scan,
    /// Reading content for hashing
    Read,
    /// Reading a capture date (the file was still organized)
    Metadata,
    /// Moving or copying into the target tree
    Transfer,
}

impl Operation {
    /// Metadata problems are fallbacks, not failures
    pub fn is_warning(&self) -> bool {
        matches!(self, Operation::Metadata)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Scan => write!(f, "scan"),
            Operation::Read => write!(f, "read"),
            Operation::Metadata => write!(f, "metadata"),
            Operation::Transfer => write!(f, "transfer"),
        }
    }
}

/// One problem with one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub op: Operation,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<PathBuf>,
    pub message: String,
}

impl From<&ScanError> for ReportEntry {
    fn from(error: &ScanError) -> Self {
        Self {
            op: Operation::Scan,
            path: error.path().clone(),
            dest_path: None,
            message: error.to_string(),
        }
    }
}

impl From<&HashError> for ReportEntry {
    fn from(error: &HashError) -> Self {
        Self {
            op: Operation::Read,
            path: error.path().clone(),
            dest_path: None,
            message: error.to_string(),
        }
    }
}

impl From<&DateWarning> for ReportEntry {
    fn from(warning: &DateWarning) -> Self {
        Self {
            op: Operation::Metadata,
            path: warning.path.clone(),
            dest_path: None,
            message: warning.error.to_string(),
        }
    }
}

impl From<&TransferFailure> for ReportEntry {
    fn from(failure: &TransferFailure) -> Self {
        Self {
            op: Operation::Transfer,
            path: failure.source.clone(),
            dest_path: failure.destination.clone(),
            message: failure.error.to_string(),
        }
    }
}

/// Outcome of a full run. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Keepers placed into the dated tree
    pub unique_count: usize,
    /// Duplicates found (each group of N contributes N - 1)
    pub duplicate_count: usize,
    /// Bytes taken up by the duplicates
    pub reclaimed_bytes: u64,
    /// Every duplicate, in the order it was recorded. These are the files
    /// routed to `Duplicates/`; a group's keeper is never listed.
    pub duplicate_paths: Vec<PathBuf>,
    /// Problems in the order they happened
    pub errors: Vec<ReportEntry>,

    pub files_scanned: usize,
    pub groups: usize,
    /// Duplicates placed into the quarantine folder
    pub duplicates_transferred: usize,
    pub mode: OperationMode,
    pub target: PathBuf,
    pub duration_ms: u64,
    pub cancelled: bool,
}

impl Report {
    /// An empty report for a run into `target`
    pub fn new(mode: OperationMode, target: PathBuf) -> Self {
        Self {
            unique_count: 0,
            duplicate_count: 0,
            reclaimed_bytes: 0,
            duplicate_paths: Vec::new(),
            errors: Vec::new(),
            files_scanned: 0,
            groups: 0,
            duplicates_transferred: 0,
            mode,
            target,
            duration_ms: 0,
            cancelled: false,
        }
    }

    /// Whether the detailed listing has anything to show
    pub fn has_details(&self) -> bool {
        self.duplicate_count > 0 || !self.errors.is_empty()
    }

    /// Entries that are real failures, not date fallbacks
    pub fn failure_count(&self) -> usize {
        self.errors.iter().filter(|e| !e.op.is_warning()).count()
    }

    /// Where duplicates were routed
    pub fn duplicates_dir(&self) -> PathBuf {
        crate::core::organize::duplicates_folder(&self.target)
    }

    /// Compact form carried by the completion event
    pub fn pipeline_summary(&self) -> PipelineSummary {
        PipelineSummary {
            files_scanned: self.files_scanned,
            unique_count: self.unique_count,
            duplicate_count: self.duplicate_count,
            reclaimed_bytes: self.reclaimed_bytes,
            error_count: self.errors.len(),
            duration_ms: self.duration_ms,
        }
    }
}
