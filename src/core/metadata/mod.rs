//! # Metadata Module
//!
//! Works out when a photo or video was captured.
//!
//! ## Sources, strongest first
//! 1. EXIF `DateTimeOriginal` (JPEG, TIFF, PNG, WebP, HEIC/HEIF)
//! 2. QuickTime movie header creation time (MP4, MOV, M4V)
//! 3. QuickTime track header creation time
//! 4. Filesystem creation time (modification time where the platform does
//!    not record creation)
//!
//! Resolution never fails. Broken metadata is returned as a warning next to
//! the fallback date so callers can report it.

mod exif_date;
mod quicktime;

pub use exif_date::parse_exif_datetime;
pub use quicktime::{read_movie_dates, MovieDates};

use crate::error::MetadataError;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Where a capture date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    ExifOriginal,
    MovieHeader,
    TrackHeader,
    FilesystemCreated,
    FilesystemModified,
    /// No timestamp could be read at all; the Unix epoch is used
    Unknown,
}

impl DateSource {
    /// Whether the date came from inside the file
    pub fn is_embedded(&self) -> bool {
        matches!(
            self,
            DateSource::ExifOriginal | DateSource::MovieHeader | DateSource::TrackHeader
        )
    }
}

/// Best available capture timestamp.
///
/// EXIF times are camera-local wall clock; QuickTime times are UTC;
/// filesystem times are converted to local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDate {
    pub timestamp: NaiveDateTime,
    pub source: DateSource,
}

/// Outcome of resolving one file
#[derive(Debug)]
pub struct Resolution {
    pub date: CaptureDate,
    /// Set when embedded metadata existed but could not be read
    pub warning: Option<MetadataError>,
}

/// Reads a capture timestamp embedded in a file.
///
/// `Ok(None)` means the format carries no usable timestamp. Implement this
/// trait to plug in another metadata library.
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Option<CaptureDate>, MetadataError>;
}

/// Container families we know how to look inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    /// JPEG, TIFF, PNG, WebP
    ExifImage,
    /// HEIC/HEIF/AVIF: EXIF inside an ISO base media file
    Heif,
    /// MP4, MOV, M4V and friends
    IsoMedia,
    /// BMP, GIF, AVI, WMV, MKV, ...
    Other,
}

fn sniff(head: &[u8]) -> Container {
    const HEIF_BRANDS: &[&[u8; 4]] = &[
        b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
        b"avif",
    ];
    const QUICKTIME_ATOMS: &[&[u8; 4]] = &[b"moov", b"mdat", b"wide", b"free", b"skip", b"pnot"];

    if head.starts_with(&[0xFF, 0xD8])
        || head.starts_with(b"II*\0")
        || head.starts_with(b"MM\0*")
        || head.starts_with(&[0x89, b'P', b'N', b'G'])
        || (head.starts_with(b"RIFF") && head.get(8..12) == Some(b"WEBP"))
    {
        return Container::ExifImage;
    }

    match head.get(4..8) {
        Some(b"ftyp") => {
            let brand = head.get(8..12).unwrap_or_default();
            if HEIF_BRANDS.iter().any(|b| &b[..] == brand) {
                Container::Heif
            } else {
                Container::IsoMedia
            }
        }
        Some(atom) if QUICKTIME_ATOMS.iter().any(|a| &a[..] == atom) => Container::IsoMedia,
        _ => Container::Other,
    }
}

/// Default reader: EXIF via kamadak-exif, QuickTime headers via mp4
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedMetadataReader;

impl EmbeddedMetadataReader {
    fn read_exif(path: &Path, file: File) -> Result<Option<CaptureDate>, MetadataError> {
        let mut reader = BufReader::new(file);
        exif_date::read_date_taken(&mut reader)
            .map(|date| {
                date.map(|timestamp| CaptureDate {
                    timestamp,
                    source: DateSource::ExifOriginal,
                })
            })
            .map_err(|reason| MetadataError::Exif {
                path: path.to_path_buf(),
                reason,
            })
    }

    fn read_movie(path: &Path, mut file: File) -> Result<Option<CaptureDate>, MetadataError> {
        let dates = read_movie_dates(&mut file).map_err(|reason| MetadataError::QuickTime {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(dates
            .movie_created
            .map(|timestamp| CaptureDate {
                timestamp,
                source: DateSource::MovieHeader,
            })
            .or_else(|| {
                dates.track_created.map(|timestamp| CaptureDate {
                    timestamp,
                    source: DateSource::TrackHeader,
                })
            }))
    }
}

impl MetadataReader for EmbeddedMetadataReader {
    fn read(&self, path: &Path) -> Result<Option<CaptureDate>, MetadataError> {
        let open = || {
            File::open(path).map_err(|source| MetadataError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let mut head = Vec::with_capacity(12);
        open()?
            .take(12)
            .read_to_end(&mut head)
            .map_err(|source| MetadataError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match sniff(&head) {
            Container::ExifImage => Self::read_exif(path, open()?),
            Container::IsoMedia => Self::read_movie(path, open()?),
            Container::Heif => match Self::read_exif(path, open()?) {
                Ok(Some(date)) => Ok(Some(date)),
                Ok(None) => Self::read_movie(path, open()?),
                Err(exif_error) => match Self::read_movie(path, open()?) {
                    Ok(Some(date)) => {
                        warn!(path = %path.display(), "ignoring broken EXIF: {exif_error}");
                        Ok(Some(date))
                    }
                    _ => Err(exif_error),
                },
            },
            Container::Other => Ok(None),
        }
    }
}

/// Resolves capture dates, falling back to filesystem time
pub struct CaptureDateResolver {
    reader: Box<dyn MetadataReader>,
}

impl CaptureDateResolver {
    pub fn new() -> Self {
        Self {
            reader: Box::new(EmbeddedMetadataReader),
        }
    }

    /// Use a different embedded-metadata reader
    pub fn with_reader(reader: Box<dyn MetadataReader>) -> Self {
        Self { reader }
    }

    /// Best-effort capture date; always produces a timestamp
    pub fn resolve(&self, path: &Path) -> Resolution {
        let warning = match self.reader.read(path) {
            Ok(Some(date)) => return Resolution { date, warning: None },
            Ok(None) => None,
            Err(e) => {
                warn!(path = %path.display(), "metadata read failed: {e}");
                Some(e)
            }
        };

        match filesystem_date(path) {
            Ok(date) => Resolution { date, warning },
            Err(e) => {
                warn!(path = %path.display(), "no usable timestamp: {e}");
                Resolution {
                    date: CaptureDate {
                        timestamp: to_local(SystemTime::UNIX_EPOCH),
                        source: DateSource::Unknown,
                    },
                    warning: warning.or(Some(e)),
                }
            }
        }
    }
}

impl Default for CaptureDateResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Filesystem creation time, or modification time where creation is not
/// recorded, as local wall-clock time
pub fn filesystem_date(path: &Path) -> Result<CaptureDate, MetadataError> {
    let metadata = std::fs::metadata(path).map_err(|source| MetadataError::FilesystemTime {
        path: path.to_path_buf(),
        source,
    })?;

    if let Ok(created) = metadata.created() {
        return Ok(CaptureDate {
            timestamp: to_local(created),
            source: DateSource::FilesystemCreated,
        });
    }

    metadata
        .modified()
        .map(|modified| CaptureDate {
            timestamp: to_local(modified),
            source: DateSource::FilesystemModified,
        })
        .map_err(|source| MetadataError::FilesystemTime {
            path: path.to_path_buf(),
            source,
        })
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn no_metadata_falls_back_to_exact_filesystem_time() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no-meta.bmp");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let resolution = CaptureDateResolver::new().resolve(&path);

        let metadata = fs::metadata(&path).unwrap();
        let expected = metadata.created().or_else(|_| metadata.modified()).unwrap();
        assert_eq!(
            resolution.date.timestamp,
            DateTime::<Local>::from(expected).naive_local()
        );
        assert!(!resolution.date.source.is_embedded());
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn exif_date_wins_for_photos() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.jpg");
        fs::write(&path, exif_date::tests::jpeg_with_date_taken("2020:06:01 08:00:00")).unwrap();

        let resolution = CaptureDateResolver::new().resolve(&path);

        assert_eq!(resolution.date.source, DateSource::ExifOriginal);
        assert_eq!(
            resolution.date.timestamp,
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
    }

    #[test]
    fn movie_header_beats_track_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mp4");
        fs::write(
            &path,
            quicktime::tests::movie_bytes(Some(noon(2017, 7, 7)), Some(noon(2016, 6, 6))),
        )
        .unwrap();

        let date = CaptureDateResolver::new().resolve(&path).date;
        assert_eq!(date.source, DateSource::MovieHeader);
        assert_eq!(date.timestamp, noon(2017, 7, 7));
    }

    #[test]
    fn track_header_used_when_movie_header_unset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mov");
        fs::write(&path, quicktime::tests::movie_bytes(None, Some(noon(2016, 6, 6)))).unwrap();

        let date = CaptureDateResolver::new().resolve(&path).date;
        assert_eq!(date.source, DateSource::TrackHeader);
        assert_eq!(date.timestamp, noon(2016, 6, 6));
    }

    #[test]
    fn broken_video_header_warns_and_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.mp4");
        let mut bytes = quicktime::tests::movie_bytes(Some(noon(2020, 1, 1)), None);
        bytes.truncate(bytes.len() - 16);
        fs::write(&path, bytes).unwrap();

        let resolution = CaptureDateResolver::new().resolve(&path);

        assert!(matches!(resolution.warning, Some(MetadataError::QuickTime { .. })));
        assert!(!resolution.date.source.is_embedded());
    }

    #[test]
    fn oversized_box_in_video_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corrupt.mov");
        let mut udta = 1u32.to_be_bytes().to_vec();
        udta.extend_from_slice(b"udta");
        udta.extend_from_slice(&u64::MAX.to_be_bytes());
        fs::write(
            &path,
            quicktime::tests::movie_with_moov_child(Some(noon(2020, 1, 1)), None, &udta),
        )
        .unwrap();

        let resolution = CaptureDateResolver::new().resolve(&path);

        assert!(matches!(resolution.warning, Some(MetadataError::QuickTime { .. })));
        assert!(!resolution.date.source.is_embedded());
    }

    #[test]
    fn missing_file_still_resolves() {
        let resolution = CaptureDateResolver::new().resolve(Path::new("/nonexistent/x.jpg"));
        assert_eq!(resolution.date.source, DateSource::Unknown);
        assert!(resolution.warning.is_some());
    }

    #[test]
    fn sniffing_recognizes_containers() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE1]), Container::ExifImage);
        assert_eq!(sniff(b"\0\0\0\x18ftypheic\0\0\0\0"), Container::Heif);
        assert_eq!(sniff(b"\0\0\0\x18ftypisom\0\0\0\0"), Container::IsoMedia);
        assert_eq!(sniff(b"\0\0\0\x08wide"), Container::IsoMedia);
        assert_eq!(sniff(b"BM\0\0\0\0"), Container::Other);
        assert_eq!(sniff(b"RIFF\0\0\0\0AVI "), Container::Other);
    }
}
