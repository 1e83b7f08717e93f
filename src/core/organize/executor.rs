//! Places grouped files into the target tree.

use super::transfer::transfer;
use super::types::*;
use crate::core::grouper::Group;
use crate::core::metadata::CaptureDateResolver;
use crate::core::paths::unique_destination;
use crate::core::pipeline::CancellationToken;
use crate::error::TransferError;
use crate::events::{Event, EventSender, OrganizeEvent, PipelinePhase, Progress};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Moves or copies each group's keeper into `<YYYY>/<Month>/` and the rest
/// into `Duplicates/`, one file at a time.
pub struct Organizer<'a> {
    target: &'a Path,
    mode: OperationMode,
    resolver: &'a CaptureDateResolver,
    cancellation: Option<CancellationToken>,
}

/// Per-run bookkeeping
struct Run<'e> {
    events: &'e EventSender,
    total: usize,
    created_dirs: HashSet<PathBuf>,
    result: OrganizeResult,
}

impl<'a> Organizer<'a> {
    pub fn new(target: &'a Path, mode: OperationMode, resolver: &'a CaptureDateResolver) -> Self {
        Self {
            target,
            mode,
            resolver,
            cancellation: None,
        }
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Organize every group. Failures are collected, never returned early.
    pub fn organize(&self, groups: &[Group], events: &EventSender) -> OrganizeResult {
        let start = Instant::now();
        let total = groups.iter().map(|g| g.members.len()).sum();

        events.send(Event::Organize(OrganizeEvent::Started {
            groups: groups.len(),
            total_files: total,
        }));

        let mut run = Run {
            events,
            total,
            created_dirs: HashSet::new(),
            result: OrganizeResult::default(),
        };

        'groups: for group in groups {
            if self.is_cancelled() {
                run.result.cancelled = true;
                break;
            }

            let keeper = group.keeper();
            let resolution = self.resolver.resolve(keeper);
            if let Some(error) = resolution.warning {
                run.result.warnings.push(DateWarning {
                    path: keeper.clone(),
                    error,
                });
            }
            let folder = dated_folder(self.target, resolution.date.timestamp);
            self.place(&mut run, keeper, &folder, Placement::Dated);

            let quarantine = duplicates_folder(self.target);
            for duplicate in group.duplicates() {
                if self.is_cancelled() {
                    run.result.cancelled = true;
                    break 'groups;
                }
                self.place(&mut run, duplicate, &quarantine, Placement::Duplicate);
            }
        }

        let result = &mut run.result;
        result.duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Organize(OrganizeEvent::Completed {
            placed: result.placed.len(),
            failed: result.failures.len(),
        }));

        run.result
    }

    fn place(&self, run: &mut Run<'_>, source: &Path, folder: &Path, placement: Placement) {
        match self.try_place(run, source, folder) {
            Ok(destination) => {
                debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "{} ok", self.mode
                );
                match placement {
                    Placement::Dated => run.result.keepers_placed += 1,
                    Placement::Duplicate => run.result.duplicates_placed += 1,
                }
                run.events.send(Event::Organize(OrganizeEvent::Placed {
                    source: source.to_path_buf(),
                    destination: destination.clone(),
                    placement,
                }));
                run.result.placed.push(PlacedFile {
                    source: source.to_path_buf(),
                    destination,
                    placement,
                });
            }
            Err(failure) => {
                warn!(path = %source.display(), "{}", failure.error);
                run.events.send(Event::Organize(OrganizeEvent::Failed {
                    path: source.to_path_buf(),
                    message: failure.error.to_string(),
                }));
                run.result.failures.push(failure);
            }
        }

        run.result.processed += 1;
        run.events.send(Event::Organize(OrganizeEvent::Progress(Progress {
            phase: PipelinePhase::Organizing,
            completed: run.result.processed,
            total: run.total,
            current_item: display_name(source),
        })));
    }

    fn try_place(
        &self,
        run: &mut Run<'_>,
        source: &Path,
        folder: &Path,
    ) -> Result<PathBuf, TransferFailure> {
        if !run.created_dirs.contains(folder) {
            fs::create_dir_all(folder).map_err(|e| TransferFailure {
                source: source.to_path_buf(),
                destination: None,
                error: TransferError::CreateDirectory {
                    path: folder.to_path_buf(),
                    source: e,
                },
            })?;
            run.created_dirs.insert(folder.to_path_buf());
        }

        let file_name = source.file_name().unwrap_or(OsStr::new("unnamed"));
        let destination = unique_destination(&folder.join(file_name));

        transfer(source, &destination, self.mode).map_err(|error| TransferFailure {
            source: source.to_path_buf(),
            destination: Some(destination.clone()),
            error,
        })?;

        Ok(destination)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
