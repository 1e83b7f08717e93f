//! End-to-end tests for the organize pipeline.
//!
//! These tests verify:
//! - Duplicate routing and date folders (real EXIF dates)
//! - Name collisions in the target tree
//! - Unreadable files
//! - Copy mode, dry runs and cancellation

use media_dedup_organizer::core::hasher::{ContentHasher, FingerprintKey, Sha256Hasher};
use media_dedup_organizer::core::metadata::{
    filesystem_date, CaptureDate, CaptureDateResolver, DateSource, MetadataReader,
};
use media_dedup_organizer::core::organize::{dated_folder, OperationMode};
use media_dedup_organizer::core::pipeline::{CancellationToken, Pipeline};
use media_dedup_organizer::core::reporter::Operation;
use media_dedup_organizer::core::ReadErrorPolicy;
use media_dedup_organizer::error::{HashError, MetadataError};
use media_dedup_organizer::events::{Event, EventChannel, PipelinePhase};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A JPEG whose only content is an EXIF block with `DateTimeOriginal`
fn jpeg_taken(date_time: &str) -> Vec<u8> {
    // Little-endian TIFF: IFD0 (offset 8) -> Exif IFD (offset 26) -> string (offset 44)
    let mut tiff = b"II*\0".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0: one entry, the ExifIFD pointer (LONG)
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD: one entry, DateTimeOriginal (ASCII, 20 bytes)
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date_time.as_bytes());
    tiff.push(0);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend(tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend(app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Fails to open any file whose name contains "locked"
struct LockedFileHasher;

impl ContentHasher for LockedFileHasher {
    fn fingerprint(&self, path: &Path) -> Result<FingerprintKey, HashError> {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if name.contains("locked") {
            return Err(HashError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
            });
        }
        Sha256Hasher::new().fingerprint(path)
    }

    fn name(&self) -> &'static str {
        "locked-file"
    }
}

#[test]
fn scenario_a_pair_of_identical_photos() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let bytes = jpeg_taken("2020:06:01 10:00:00");
    write(source.path(), "a.jpg", &bytes);
    write(source.path(), "b.jpg", &bytes);

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .build()
        .run()
        .unwrap();

    assert_eq!(report.duplicate_count, 1);
    assert_eq!(report.reclaimed_bytes, bytes.len() as u64);
    assert_eq!(report.unique_count, 1);
    assert_eq!(report.duplicates_transferred, 1);
    assert_eq!(report.duplicate_paths.len(), 1);
    assert!(report.errors.is_empty());

    assert_eq!(files_in(&target.path().join("2020/June")).len(), 1);
    assert_eq!(files_in(&target.path().join("Duplicates")).len(), 1);
    assert!(files_in(source.path()).is_empty());
}

#[test]
fn scenario_b_three_copies_with_same_name() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let bytes = jpeg_taken("2019:12:24 18:00:00");
    for dir in ["phone", "camera", "backup"] {
        write(source.path(), &format!("{dir}/IMG_0001.jpg"), &bytes);
    }

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .concurrency(3)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.duplicate_count, 2);
    assert_eq!(report.reclaimed_bytes, 2 * bytes.len() as u64);
    assert_eq!(files_in(&target.path().join("2019/December")), vec!["IMG_0001.jpg"]);
    assert_eq!(
        files_in(&target.path().join("Duplicates")),
        vec!["IMG_0001 (1).jpg", "IMG_0001.jpg"]
    );
}

#[test]
fn scenario_c_unreadable_file_is_kept_as_unique() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let bytes = jpeg_taken("2021:03:05 08:00:00");
    let locked = write(source.path(), "locked.jpg", &bytes);
    write(source.path(), "open.jpg", &bytes);

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .hasher(Box::new(LockedFileHasher))
        .build()
        .run()
        .unwrap();

    let read_errors: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.op == Operation::Read)
        .collect();
    assert_eq!(read_errors.len(), 1);
    assert_eq!(read_errors[0].path, locked);

    // Same bytes, but never grouped with open.jpg
    assert_eq!(report.duplicate_count, 0);
    assert_eq!(report.unique_count, 2);
    assert_eq!(
        files_in(&target.path().join("2021/March")),
        vec!["locked.jpg", "open.jpg"]
    );
}

#[test]
fn scenario_c_skip_policy_leaves_file_in_place() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let locked = write(source.path(), "locked.jpg", &jpeg_taken("2021:03:05 08:00:00"));

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .hasher(Box::new(LockedFileHasher))
        .read_error_policy(ReadErrorPolicy::Skip)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.unique_count, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(locked.exists());
}

#[test]
fn scenario_d_existing_destination_gets_suffix() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write(source.path(), "a.jpg", &jpeg_taken("2020:06:01 10:00:00"));
    let existing = write(target.path(), "2020/June/a.jpg", b"already here");

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .build()
        .run()
        .unwrap();

    assert_eq!(report.unique_count, 1);
    assert_eq!(fs::read(&existing).unwrap(), b"already here");
    assert!(target.path().join("2020/June/a (1).jpg").exists());
}

#[test]
fn copy_mode_leaves_sources() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let bytes = jpeg_taken("2018:07:04 12:00:00");
    let a = write(source.path(), "a.jpg", &bytes);
    let b = write(source.path(), "nested/b.jpg", &bytes);

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .mode(OperationMode::Copy)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.mode, OperationMode::Copy);
    assert!(a.exists() && b.exists());
    assert_eq!(files_in(&target.path().join("2018/July")).len(), 1);
    assert_eq!(files_in(&target.path().join("Duplicates")).len(), 1);
}

#[test]
fn duplicate_paths_name_the_files_in_duplicates_folder() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let bytes = jpeg_taken("2018:07:04 12:00:00");
    write(source.path(), "first.jpg", &bytes);
    write(source.path(), "second.jpg", &bytes);
    write(source.path(), "third.jpg", &bytes);

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .mode(OperationMode::Copy)
        .build()
        .run()
        .unwrap();

    let mut listed: Vec<String> = report
        .duplicate_paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    listed.sort();
    assert_eq!(listed, files_in(&target.path().join("Duplicates")));

    let keeper = files_in(&target.path().join("2018/July"));
    assert_eq!(keeper.len(), 1);
    assert!(!listed.contains(&keeper[0]));
}

#[test]
fn files_without_metadata_use_filesystem_time() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let clip = write(source.path(), "clip.mkv", b"not really a video");
    let expected = dated_folder(target.path(), filesystem_date(&clip).unwrap().timestamp);

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .mode(OperationMode::Copy)
        .build()
        .run()
        .unwrap();

    assert_eq!(report.unique_count, 1);
    assert!(expected.join("clip.mkv").exists());
    assert!(!target.path().join("Duplicates").exists());
}

#[test]
fn unrecognized_extensions_are_ignored() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let notes = write(source.path(), "notes.txt", b"hello");
    write(source.path(), "a.png", b"png-ish");

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .extensions(["PNG"])
        .build()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert!(notes.exists());
}

#[test]
fn analyze_changes_nothing() {
    let source = TempDir::new().unwrap();
    let bytes = jpeg_taken("2020:06:01 10:00:00");
    let a = write(source.path(), "a.jpg", &bytes);
    let b = write(source.path(), "b.jpg", &bytes);
    let c = write(source.path(), "c.jpg", b"different");

    let analysis = Pipeline::builder().source(source.path()).build().analyze().unwrap();

    assert_eq!(analysis.files_scanned, 3);
    assert_eq!(analysis.groups.len(), 2);
    assert_eq!(analysis.ledger.count(), 1);
    assert_eq!(analysis.duplicate_groups().count(), 1);
    assert!(a.exists() && b.exists() && c.exists());
}

/// Cancels the shared token as soon as it hashes anything
struct CancellingHasher(CancellationToken);

impl ContentHasher for CancellingHasher {
    fn fingerprint(&self, path: &Path) -> Result<FingerprintKey, HashError> {
        self.0.cancel();
        Sha256Hasher::new().fingerprint(path)
    }

    fn name(&self) -> &'static str {
        "cancelling"
    }
}

#[test]
fn cancel_while_hashing_organizes_nothing() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    for i in 0..5 {
        write(source.path(), &format!("{i}.jpg"), &[i as u8; 16]);
    }
    let token = CancellationToken::new();

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .concurrency(1)
        .hasher(Box::new(CancellingHasher(token.clone())))
        .cancellation(token)
        .build()
        .run()
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.unique_count, 0);
    assert_eq!(files_in(source.path()).len(), 5);
    assert!(files_in(target.path()).is_empty());
}

/// Cancels the shared token the first time a date is needed
struct CancellingReader(CancellationToken);

impl MetadataReader for CancellingReader {
    fn read(&self, _path: &Path) -> Result<Option<CaptureDate>, MetadataError> {
        self.0.cancel();
        Ok(Some(CaptureDate {
            timestamp: chrono::NaiveDate::from_ymd_opt(2022, 2, 2)
                .unwrap()
                .and_hms_opt(2, 2, 2)
                .unwrap(),
            source: DateSource::ExifOriginal,
        }))
    }
}

#[test]
fn cancel_while_organizing_finishes_current_file_only() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    for i in 0..4 {
        write(source.path(), &format!("{i}.jpg"), &[i as u8; 16]);
    }
    let token = CancellationToken::new();

    let report = Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .date_resolver(CaptureDateResolver::with_reader(Box::new(CancellingReader(
            token.clone(),
        ))))
        .cancellation(token)
        .build()
        .run()
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.unique_count, 1);
    assert_eq!(files_in(&target.path().join("2022/February")).len(), 1);
    assert_eq!(files_in(source.path()).len(), 3);
}

#[test]
fn progress_is_monotonic_in_each_phase() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    for i in 0..10 {
        write(source.path(), &format!("{i}.jpg"), &[i as u8 % 3; 32]);
    }
    let (sender, receiver) = EventChannel::new();

    Pipeline::builder()
        .source(source.path())
        .target(target.path())
        .concurrency(4)
        .build()
        .run_with_events(&sender)
        .unwrap();

    let events = receiver.drain();
    for phase in [PipelinePhase::Hashing, PipelinePhase::Organizing] {
        let counts: Vec<usize> = events
            .iter()
            .filter_map(Event::progress)
            .filter(|p| p.phase == phase)
            .map(|p| {
                assert_eq!(p.total, 10);
                assert!(p.current_item.ends_with(".jpg"));
                p.completed
            })
            .collect();
        assert_eq!(counts, (1..=10).collect::<Vec<_>>());
    }
}
