//! Date-based organization of grouped files.
//!
//! Keepers go to `target/<YYYY>/<Month>/`, every other group member to the
//! flat `target/Duplicates/` folder. Runs sequentially; name collisions are
//! resolved with ` (n)` suffixes.

mod executor;
mod transfer;
mod types;

pub use executor::Organizer;
pub use transfer::transfer;
pub use types::*;
