//! Single-file move/copy that never leaves a half-written destination.

use super::types::OperationMode;
use crate::error::TransferError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Move or copy `source` to `dest`, which must not exist yet.
///
/// On failure the source is untouched and `dest` does not exist.
pub fn transfer(source: &Path, dest: &Path, mode: OperationMode) -> Result<(), TransferError> {
    match mode {
        OperationMode::Copy => copy_new(source, dest).map_err(|e| match e {
            CopyFailure::Io(source_err) => TransferError::Copy {
                source_path: source.to_path_buf(),
                dest_path: dest.to_path_buf(),
                source: source_err,
            },
            CopyFailure::Verification(error) => error,
        }),
        OperationMode::Move => move_file(source, dest),
    }
}

fn move_file(source: &Path, dest: &Path) -> Result<(), TransferError> {
    let rename_err = match fs::rename(source, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    // rename fails across filesystems, fall back to copy + delete
    debug!(
        source = %source.display(),
        "rename failed ({rename_err}), copying instead"
    );

    let move_error = |e: io::Error| TransferError::Move {
        source_path: source.to_path_buf(),
        dest_path: dest.to_path_buf(),
        source: e,
    };

    match copy_new(source, dest) {
        Ok(()) => {}
        Err(CopyFailure::Io(e)) => return Err(move_error(e)),
        Err(CopyFailure::Verification(error)) => return Err(error),
    }

    fs::remove_file(source).map_err(|e| {
        // Keep exactly one copy: the original
        let _ = fs::remove_file(dest);
        move_error(e)
    })
}

enum CopyFailure {
    Io(io::Error),
    Verification(TransferError),
}

impl From<io::Error> for CopyFailure {
    fn from(e: io::Error) -> Self {
        CopyFailure::Io(e)
    }
}

/// Copy into a freshly created file, removing it again on any failure
fn copy_new(source: &Path, dest: &Path) -> Result<(), CopyFailure> {
    let mut reader = File::open(source)?;
    let expected = reader.metadata()?.len();

    write_new(&mut reader, expected, dest)?;

    if let Ok(meta) = fs::metadata(source) {
        let _ = fs::set_permissions(dest, meta.permissions());
    }
    Ok(())
}

/// Stream `reader` into `dest`, which must not exist. `dest` is gone again
/// unless exactly `expected` bytes were written and synced.
fn write_new<R: Read>(reader: &mut R, expected: u64, dest: &Path) -> Result<(), CopyFailure> {
    let mut writer = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let result = io::copy(reader, &mut writer)
        .and_then(|written| writer.sync_all().map(|()| written))
        .map_err(CopyFailure::Io)
        .and_then(|written| {
            if written == expected {
                Ok(())
            } else {
                Err(CopyFailure::Verification(TransferError::Verification {
                    dest_path: dest.to_path_buf(),
                    expected,
                    actual: written,
                }))
            }
        });
    drop(writer);

    if result.is_err() {
        let _ = fs::remove_file(dest);
    }
    result
}
