//! # Pipeline Module
//!
//! Orchestrates a full run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Find media files under the source folder
//! 2. **Hash** - Fingerprint every file on a bounded worker pool
//! 3. **Organize** - Place keepers by capture date, quarantine duplicates
//!
//! Hashing finishes completely before organizing starts: a file can only be
//! called a keeper once its group is final.
//!
//! ## Parallelism
//! Hashing runs on a dedicated rayon pool; organizing is sequential.

mod cancel;
mod executor;

pub use cancel::CancellationToken;
pub use executor::{Analysis, Pipeline, PipelineBuilder, PipelineConfig};
