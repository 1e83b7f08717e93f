//! Bounded-concurrency hashing into a shared [`GroupIndex`].

use super::{DuplicateLedger, Group, GroupIndex, GroupKey};
use crate::core::hasher::ContentHasher;
use crate::core::pipeline::CancellationToken;
use crate::core::scanner::MediaFile;
use crate::error::{HashError, ValidationError};
use crate::events::{Event, EventSender, HashEvent, PipelinePhase, Progress};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Half the available cores, at least one. Hashing is mostly I/O bound and
/// the rest is left for the disk.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// What to do with a file whose content cannot be read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadErrorPolicy {
    /// Give it a group of its own and organize it like any unique file
    #[default]
    KeepAsUnique,
    /// Report it and leave it where it is
    Skip,
}

/// Outcome of the hashing phase
#[derive(Debug, Default)]
pub struct Grouping {
    /// Groups in creation order
    pub groups: Vec<Group>,
    /// Duplicate tally
    pub ledger: DuplicateLedger,
    /// Files that could not be read
    pub failures: Vec<HashError>,
    /// Files that finished hashing (successfully or not)
    pub completed: usize,
    /// Whether the run was cancelled before every file was hashed
    pub cancelled: bool,
}

/// Everything the workers mutate, behind one lock
struct Shared {
    index: GroupIndex,
    failures: Vec<HashError>,
    completed: usize,
}

/// Hashes files on a dedicated pool and groups them by content
pub struct DuplicateGrouper<'a> {
    hasher: &'a dyn ContentHasher,
    concurrency: usize,
    policy: ReadErrorPolicy,
    cancellation: Option<CancellationToken>,
}

impl<'a> DuplicateGrouper<'a> {
    pub fn new(hasher: &'a dyn ContentHasher) -> Self {
        Self {
            hasher,
            concurrency: default_concurrency(),
            policy: ReadErrorPolicy::default(),
            cancellation: None,
        }
    }

    /// Maximum files hashed at once
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn read_error_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Hash every file and group by content.
    ///
    /// Returns once every worker has finished; the grouping is complete when
    /// this returns (unless cancelled).
    pub fn group(
        &self,
        files: &[MediaFile],
        events: &EventSender,
    ) -> Result<Grouping, ValidationError> {
        if self.concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency { value: 0 });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("hash-worker-{i}"))
            .build()
            .map_err(|e| ValidationError::WorkerPool {
                reason: e.to_string(),
            })?;

        let total = files.len();
        events.send(Event::Hash(HashEvent::Started {
            total_files: total,
            concurrency: self.concurrency,
        }));

        let shared = Mutex::new(Shared {
            index: GroupIndex::new(),
            failures: Vec::new(),
            completed: 0,
        });

        pool.install(|| {
            files.par_iter().for_each(|file| {
                if self.is_cancelled() {
                    return;
                }

                // The read happens outside the lock
                let outcome = self.hasher.fingerprint(&file.path);
                if let Ok(key) = &outcome {
                    debug!(path = %file.path.display(), digest = key.short(), "hashed");
                }

                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(key) => {
                        let size = key.size;
                        let newly = state
                            .index
                            .admit(GroupKey::Content(key), file.path.clone(), size);
                        if newly > 0 {
                            debug!(path = %file.path.display(), newly, "duplicate recorded");
                        }
                    }
                    Err(error) => {
                        warn!(path = %file.path.display(), "hashing failed: {error}");
                        events.send(Event::Hash(HashEvent::Failed {
                            path: file.path.clone(),
                            message: error.to_string(),
                        }));
                        if self.policy == ReadErrorPolicy::KeepAsUnique {
                            let size = file.size().unwrap_or(0);
                            state
                                .index
                                .admit(GroupKey::unreadable(), file.path.clone(), size);
                        }
                        state.failures.push(error);
                    }
                }

                // Counted under the lock so progress is strictly increasing
                state.completed += 1;
                events.send(Event::Hash(HashEvent::Progress(Progress {
                    phase: PipelinePhase::Hashing,
                    completed: state.completed,
                    total,
                    current_item: file.display_name(),
                })));
            });
        });

        let shared = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        let (groups, ledger) = shared.index.into_parts();

        events.send(Event::Hash(HashEvent::Completed {
            groups: groups.len(),
            duplicate_count: ledger.count(),
            reclaimed_bytes: ledger.reclaimed_bytes,
        }));

        Ok(Grouping {
            groups,
            ledger,
            failures: shared.failures,
            cancelled: shared.completed < total && self.is_cancelled(),
            completed: shared.completed,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
    }
}
