//! Types for the organize module.

use crate::error::{MetadataError, TransferError};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the flat folder duplicates are routed into
pub const DUPLICATES_DIR: &str = "Duplicates";

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Move files to destination
    #[default]
    Move,
    /// Copy files to destination (keep originals)
    Copy,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::Move => write!(f, "move"),
            OperationMode::Copy => write!(f, "copy"),
        }
    }
}

impl FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "move" => Ok(OperationMode::Move),
            "copy" => Ok(OperationMode::Copy),
            other => Err(format!("unknown mode '{other}' (expected move or copy)")),
        }
    }
}

/// Where in the target tree a file went
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// A keeper, under `<YYYY>/<Month>/`
    Dated,
    /// A non-keeper, under `Duplicates/`
    Duplicate,
}

/// `target/<YYYY>/<Month>` for a capture date
pub fn dated_folder(target: &Path, date: NaiveDateTime) -> PathBuf {
    target
        .join(format!("{:04}", date.year()))
        .join(date.format("%B").to_string())
}

/// `target/Duplicates`
pub fn duplicates_folder(target: &Path) -> PathBuf {
    target.join(DUPLICATES_DIR)
}

/// A file that reached the target tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub placement: Placement,
}

/// A file that could not be placed; it stays where it was
#[derive(Debug)]
pub struct TransferFailure {
    pub source: PathBuf,
    /// Absent when the destination folder itself could not be created
    pub destination: Option<PathBuf>,
    pub error: TransferError,
}

/// A fallback taken while dating a keeper
#[derive(Debug)]
pub struct DateWarning {
    pub path: PathBuf,
    pub error: MetadataError,
}

/// Result of organizing every group
#[derive(Debug, Default)]
pub struct OrganizeResult {
    /// Keepers placed into the dated tree
    pub keepers_placed: usize,
    /// Duplicates placed into the quarantine folder
    pub duplicates_placed: usize,
    /// Every successful transfer, in order
    pub placed: Vec<PlacedFile>,
    pub failures: Vec<TransferFailure>,
    pub warnings: Vec<DateWarning>,
    /// Files handled so far, whether they succeeded or not
    pub processed: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}
