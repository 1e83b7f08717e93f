//! Event type definitions for progress reporting.

use crate::core::organize::Placement;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Organizing phase events
    Organize(OrganizeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

impl Event {
    /// The uniform progress view of this event, if it carries one
    pub fn progress(&self) -> Option<&Progress> {
        match self {
            Event::Hash(HashEvent::Progress(p)) | Event::Organize(OrganizeEvent::Progress(p)) => {
                Some(p)
            }
            _ => None,
        }
    }
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A media file was found
    FileFound { path: PathBuf, files_found: usize },
    /// An entry could not be read and was skipped
    Skipped { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_files: usize, concurrency: usize },
    /// One more file finished hashing
    Progress(Progress),
    /// A file could not be read
    Failed { path: PathBuf, message: String },
    /// Hashing completed
    Completed {
        groups: usize,
        duplicate_count: usize,
        reclaimed_bytes: u64,
    },
}

/// Events during the organizing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Organizing has started
    Started { groups: usize, total_files: usize },
    /// One more file was handled
    Progress(Progress),
    /// A file landed in the target tree
    Placed {
        source: PathBuf,
        destination: PathBuf,
        placement: Placement,
    },
    /// A file could not be placed
    Failed { path: PathBuf, message: String },
    /// Organizing completed
    Completed { placed: usize, failed: usize },
}

/// Progress counters shared by the hashing and organizing phases.
///
/// `completed` only ever increases within a phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Phase the counters belong to
    pub phase: PipelinePhase,
    /// Files finished so far
    pub completed: usize,
    /// Files in this phase
    pub total: usize,
    /// Display name of the file just finished
    pub current_item: String,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started { source: PathBuf, target: PathBuf },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled { phase: PipelinePhase },
}

/// Phases of a run
///
/// `Idle -> Scanning -> Hashing -> Organizing -> Done`. Only `Organizing`
/// touches the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Idle,
    Scanning,
    Hashing,
    Organizing,
    Done,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Media files found by the scan
    pub files_scanned: usize,
    /// Keepers placed in the dated tree
    pub unique_count: usize,
    /// Files recognized as duplicates
    pub duplicate_count: usize,
    /// Bytes taken up by duplicates
    pub reclaimed_bytes: u64,
    /// Number of recorded errors and warnings
    pub error_count: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Idle => write!(f, "Idle"),
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Organizing => write!(f, "Organizing"),
            PipelinePhase::Done => write!(f, "Done"),
        }
    }
}
