//! # media-organize CLI
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! media-organize run ~/Camera ~/Library --mode copy
//! media-organize analyze ~/Camera --output json
//! ```

mod cli;

use media_dedup_organizer::Result;

fn main() -> Result<()> {
    cli::run()
}
