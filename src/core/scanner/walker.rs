//! Directory walking implementation using walkdir.

use super::{filter::MediaFilter, MediaFile, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links. When off, links to media files are
    /// reported as skipped.
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            include_hidden: true,
            max_depth: None,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct MediaScanner {
    config: ScanConfig,
    filter: MediaFilter,
}

impl MediaScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = MediaFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    /// The filter this scanner applies
    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    /// Lazily walk `root`, yielding media files and skipped entries.
    ///
    /// Order is whatever the filesystem enumerates; it is not stable across
    /// platforms. Symlink loops and unreadable entries come out as `Err` and
    /// the walk carries on.
    pub fn walk<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = Result<MediaFile, ScanError>> + 'a {
        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        walker
            .into_iter()
            .filter_entry(move |entry| {
                !entry.file_type().is_dir() || self.filter.should_descend(entry.path(), root)
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) if !self.filter.should_include(entry.path()) => None,
                Ok(entry) if entry.file_type().is_file() => {
                    Some(Ok(MediaFile::new(entry.into_path())))
                }
                Ok(entry) if entry.path_is_symlink() => Some(Err(ScanError::SymlinkNotFollowed {
                    path: entry.into_path(),
                })),
                Ok(_) => None,
                Err(e) => Some(Err(classify_walk_error(e))),
            })
    }

    /// Walk `root` to completion, reporting progress via events
    pub fn scan_with_events(&self, root: &Path, events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        for item in self.walk(root) {
            match item {
                Ok(file) => {
                    events.send(Event::Scan(ScanEvent::FileFound {
                        path: file.path.clone(),
                        files_found: files.len() + 1,
                    }));
                    files.push(file);
                }
                Err(error) => {
                    warn!(path = %error.path().display(), "skipping entry: {error}");
                    events.send(Event::Scan(ScanEvent::Skipped {
                        path: error.path().clone(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        ScanResult { files, errors }
    }

    /// Walk `root` without progress reporting
    pub fn scan(&self, root: &Path) -> ScanResult {
        self.scan_with_events(root, &crate::events::null_sender())
    }
}

fn classify_walk_error(e: walkdir::Error) -> ScanError {
    let path = e.path().map(PathBuf::from).unwrap_or_default();

    if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadEntry {
            path,
            reason: e.to_string(),
        }
    }
}
