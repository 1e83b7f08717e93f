//! Collision-free destination paths.
//!
//! `photo.jpg` is used as-is when free, otherwise `photo (1).jpg`,
//! `photo (2).jpg`, ... The filesystem is re-checked on every call; nothing is
//! cached, so a path handed out by one call and then written to is seen by the
//! next.

use std::fs;
use std::path::{Path, PathBuf};

/// First path at or derived from `desired` with no filesystem entry
pub fn unique_destination(desired: &Path) -> PathBuf {
    if !occupied(desired) {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = desired.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = desired.parent().unwrap_or(Path::new(""));

    (1u64..)
        .map(|counter| {
            let name = match &ext {
                Some(ext) => format!("{stem} ({counter}).{ext}"),
                None => format!("{stem} ({counter})"),
            };
            parent.join(name)
        })
        .find(|candidate| !occupied(candidate))
        .unwrap_or_else(|| desired.to_path_buf())
}

/// Any entry counts, including a dangling symlink
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
