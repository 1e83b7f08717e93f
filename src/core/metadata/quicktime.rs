//! Creation times from QuickTime / ISO base media headers.
//!
//! The box structure is parsed by the `mp4` crate. We only look at the
//! `moov/mvhd` creation time and the first non-zero `moov/trak/tkhd`
//! creation time; `mdat` payloads are skipped, never read.

use chrono::{DateTime, NaiveDateTime};
use mp4::{BoxType, Mp4Reader};
use std::io::{self, Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};

/// Seconds between 1904-01-01 (QuickTime epoch) and 1970-01-01
const QUICKTIME_EPOCH_OFFSET: u64 = 2_082_844_800;

/// Seeks allowed while parsing one file
const SEEK_BUDGET: u32 = 1_000_000;

/// Creation times found in a movie's headers, in UTC
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovieDates {
    /// From the movie header (`mvhd`)
    pub movie_created: Option<NaiveDateTime>,
    /// From the first track header (`tkhd`) that has one
    pub track_created: Option<NaiveDateTime>,
}

/// Read creation times from an ISO base media stream.
///
/// A stream without a `moov` box yields empty dates, not an error. Errors
/// mean the box structure itself is broken.
pub fn read_movie_dates<R: Read + Seek>(reader: &mut R) -> Result<MovieDates, String> {
    let size = reader
        .seek(SeekFrom::End(0))
        .map_err(|e| format!("cannot determine length: {e}"))?;
    reader.seek(SeekFrom::Start(0)).map_err(|e| e.to_string())?;

    let parsed = panic::catch_unwind(AssertUnwindSafe(move || {
        Mp4Reader::read_header(SeekBudget::new(reader), size)
    }))
    .map_err(|_| "header parser panicked".to_string())?;

    let movie = match parsed {
        Ok(movie) => movie,
        Err(mp4::Error::BoxNotFound(BoxType::MoovBox)) => return Ok(MovieDates::default()),
        Err(e) => return Err(e.to_string()),
    };

    Ok(MovieDates {
        movie_created: from_quicktime_seconds(movie.moov.mvhd.creation_time),
        track_created: movie
            .moov
            .traks
            .iter()
            .find_map(|trak| from_quicktime_seconds(trak.tkhd.creation_time)),
    })
}

/// Zero means "not set"
fn from_quicktime_seconds(seconds: u64) -> Option<NaiveDateTime> {
    if seconds == 0 {
        return None;
    }
    let unix = i64::try_from(seconds.checked_sub(QUICKTIME_EPOCH_OFFSET)?).ok()?;
    DateTime::from_timestamp(unix, 0).map(|dt| dt.naive_utc())
}

/// Stops a parse that keeps seeking.
///
/// A zero-sized box makes the parser seek back onto its own header and read
/// it again indefinitely.
struct SeekBudget<R> {
    inner: R,
    remaining: u32,
}

impl<R> SeekBudget<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            remaining: SEEK_BUDGET,
        }
    }
}

impl<R: Read> Read for SeekBudget<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for SeekBudget<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.remaining = self.remaining.checked_sub(1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "box structure does not terminate")
        })?;
        self.inner.seek(pos)
    }
}
