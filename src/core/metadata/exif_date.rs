//! EXIF capture time for photos.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::io::{BufRead, Seek};

/// `DateTimeOriginal` from the primary image.
///
/// `Ok(None)` when the container has no EXIF block or the tag is absent or
/// blank. Errors are for EXIF data that is present but unreadable.
pub fn read_date_taken<R: BufRead + Seek>(reader: &mut R) -> Result<Option<NaiveDateTime>, String> {
    let exif = match Reader::new().read_from_container(reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };

    let Value::Ascii(ref values) = field.value else {
        return Ok(None);
    };

    Ok(values
        .first()
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .and_then(parse_exif_datetime))
}

/// Parse "YYYY:MM:DD HH:MM:SS", tolerating `-` separators and padding
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_matches(|c: char| c == '"' || c == '\0' || c.is_whitespace());

    ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}
