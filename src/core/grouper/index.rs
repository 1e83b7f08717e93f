//! Key -> group bookkeeping with exactly-once duplicate accounting.
//!
//! Groups are built incrementally, in whatever order hashes finish. Each group
//! keeps a cursor over its members saying how many have already been entered
//! into the [`DuplicateLedger`]; every admission catches the cursor up to the
//! end of the group. A member is therefore recorded exactly once no matter how
//! arrivals interleave, and the keeper (index 0) is never recorded.

use super::{Group, GroupKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Running tally of duplicate files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateLedger {
    /// Every non-keeper member, in the order it was recorded
    pub paths: Vec<PathBuf>,
    /// Bytes that would be freed by dropping every duplicate
    pub reclaimed_bytes: u64,
}

impl DuplicateLedger {
    /// Number of duplicate files recorded
    pub fn count(&self) -> usize {
        self.paths.len()
    }
}

#[derive(Debug)]
struct Slot {
    group: Group,
    /// Members before this index are accounted for
    recorded_upto: usize,
}

/// Append-or-create map from [`GroupKey`] to [`Group`].
///
/// Not synchronized itself; the grouper wraps it in a mutex so that only this
/// bookkeeping is serialized, never the file reads.
#[derive(Debug, Default)]
pub struct GroupIndex {
    positions: HashMap<GroupKey, usize>,
    slots: Vec<Slot>,
    ledger: DuplicateLedger,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` to the group for `key`, creating the group if needed.
    ///
    /// Returns how many members were newly recorded as duplicates.
    pub fn admit(&mut self, key: GroupKey, path: PathBuf, size: u64) -> usize {
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => {
                self.positions.insert(key.clone(), self.slots.len());
                self.slots.push(Slot {
                    group: Group {
                        key,
                        members: vec![path],
                        size,
                    },
                    recorded_upto: 1,
                });
                return 0;
            }
        };

        let slot = &mut self.slots[position];
        slot.group.members.push(path);

        // Catch up on everything past the keeper that is not yet recorded
        let pending = &slot.group.members[slot.recorded_upto..];
        let newly = pending.len();
        self.ledger.paths.extend(pending.iter().cloned());
        self.ledger.reclaimed_bytes += slot.group.size * newly as u64;
        slot.recorded_upto = slot.group.members.len();

        newly
    }

    /// Number of groups, duplicate or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current tally
    pub fn ledger(&self) -> &DuplicateLedger {
        &self.ledger
    }

    /// Groups in creation order, plus the final tally
    pub fn into_parts(self) -> (Vec<Group>, DuplicateLedger) {
        let groups = self.slots.into_iter().map(|slot| slot.group).collect();
        (groups, self.ledger)
    }
}
