//! # Media Dedup Organizer
//!
//! Finds byte-identical duplicates in a folder of photos and videos, files
//! each unique item under `<YYYY>/<Month>/` by capture date and sets the
//! duplicates aside in a `Duplicates/` folder.
//!
//! ## Core Philosophy
//! - **Nothing is deleted** - duplicates are quarantined, never removed
//! - **Best effort** - one bad file never stops the run; every problem is reported
//! - **Exact matches only** - files are compared by SHA-256 of their content
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Scanning, hashing, grouping, dating and organizing
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `config` - Optional settings file

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the application.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks `debug` over `warn`.
/// Calling this twice is harmless. Meant for the entry point only.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
