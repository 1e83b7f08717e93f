//! # Grouper Module
//!
//! Hashes the scanned files concurrently and partitions them by content.
//!
//! ## Keeper Selection
//! The first path admitted to a group is its keeper. Admission order is the
//! order in which hashes *finish*, so the keeper is arbitrary across runs; it
//! is not the oldest file or the shortest path.

mod index;
mod parallel;

pub use index::{DuplicateLedger, GroupIndex};
pub use parallel::{default_concurrency, DuplicateGrouper, Grouping, ReadErrorPolicy};

use crate::core::hasher::FingerprintKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// What a group is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// Files with this exact content
    Content(FingerprintKey),
    /// A file that could not be read; the random token keeps it alone
    Unreadable(Uuid),
}

impl GroupKey {
    /// Fresh key that no other file will ever share
    pub fn unreadable() -> Self {
        GroupKey::Unreadable(Uuid::new_v4())
    }
}

/// Files sharing a [`GroupKey`], in admission order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub key: GroupKey,
    /// Never empty; the first entry is the keeper
    pub members: Vec<PathBuf>,
    /// Size of each member in bytes
    pub size: u64,
}

impl Group {
    /// The member organized into the dated tree
    pub fn keeper(&self) -> &PathBuf {
        &self.members[0]
    }

    /// Members routed to the quarantine folder
    pub fn duplicates(&self) -> &[PathBuf] {
        &self.members[1..]
    }

    /// Whether anything in this group is a duplicate
    pub fn has_duplicates(&self) -> bool {
        self.members.len() > 1
    }
}
