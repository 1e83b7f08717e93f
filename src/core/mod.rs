//! # Core Module
//!
//! The presentation-agnostic organizing engine.
//!
//! ## Modules
//! - `scanner` - Finds media files under a folder
//! - `hasher` - Fingerprints file content (SHA-256)
//! - `grouper` - Groups files by fingerprint, concurrently
//! - `metadata` - Works out when a photo or video was captured
//! - `paths` - Collision-free destination names
//! - `organize` - Moves or copies files into the dated tree
//! - `reporter` - The run report and its renderings
//! - `pipeline` - Orchestrates the full workflow

pub mod grouper;
pub mod hasher;
pub mod metadata;
pub mod organize;
pub mod paths;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use grouper::{Group, GroupKey, ReadErrorPolicy};
pub use hasher::{ContentHasher, FingerprintKey};
pub use metadata::{CaptureDate, CaptureDateResolver};
pub use organize::OperationMode;
pub use pipeline::{Analysis, CancellationToken, Pipeline, PipelineBuilder};
pub use reporter::{Report, ReportEntry};
pub use scanner::MediaFile;
