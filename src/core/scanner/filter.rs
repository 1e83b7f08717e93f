//! Extension filtering for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Extensions recognized when no override is configured.
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "gif", "tiff", "heic", "heif", "mp4", "avi", "mov", "wmv", "mkv",
    "m4v",
];

/// Decides whether a path is a media file worth organizing
#[derive(Debug, Clone)]
pub struct MediaFilter {
    /// Lowercase extensions without the leading dot
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl MediaFilter {
    /// Create a filter for the default media extensions
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_MEDIA_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: true,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Replace the recognized extensions.
    ///
    /// Accepts `"JPG"`, `".jpg"` and `"jpg"` alike.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Whether no extension is recognized at all
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    /// Whether a directory should be descended into
    pub fn should_descend(&self, path: &Path, root: &Path) -> bool {
        self.include_hidden || path == root || !is_hidden(path)
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase and strip a leading dot
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
