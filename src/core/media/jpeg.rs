//! Capture time of camera JPEGs, read from embedded EXIF.

use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

/// Read the capture time of the JPEG at `path`
pub(super) fn capture_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let file = File::open(path).map_err(|e| MetadataError::io(path, e))?;
    let mut reader = BufReader::new(file);
    capture_time_from(&mut reader, path)
}

/// Decode EXIF from any JPEG stream and return its capture time.
///
/// `path` is only used to label errors.
pub(super) fn capture_time_from<R: BufRead + Seek>(
    reader: &mut R,
    path: &Path,
) -> Result<NaiveDateTime, MetadataError> {
    let exif = Reader::new()
        .read_from_container(reader)
        .map_err(|e| match e {
            exif::Error::NotFound(_) => MetadataError::ExifNotFound {
                path: path.to_path_buf(),
            },
            exif::Error::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                MetadataError::ExifNotFound {
                    path: path.to_path_buf(),
                }
            }
            other => MetadataError::ExifDecode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

    // DateTimeOriginal is when the shutter fired; DateTime is the fallback.
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))
        .ok_or_else(|| MetadataError::ExifNotFound {
            path: path.to_path_buf(),
        })?;

    let raw = match field.value {
        Value::Ascii(ref vec) => vec
            .first()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(|s| s.trim_end_matches('\0').trim().to_string()),
        _ => None,
    }
    .ok_or_else(|| MetadataError::InvalidTimestamp {
        path: path.to_path_buf(),
        value: field.display_value().to_string(),
    })?;

    parse_exif_datetime(&raw).ok_or_else(|| MetadataError::InvalidTimestamp {
        path: path.to_path_buf(),
        value: raw.clone(),
    })
}

/// EXIF timestamps look like `2024:11:13 10:00:00`
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn parses_exif_format() {
        let dt = parse_exif_datetime("2024:11:13 10:00:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-11-13 10:00");
    }

    #[test]
    fn rejects_blank_timestamp() {
        assert!(parse_exif_datetime("    :  :     :  :  ").is_none());
    }

    #[test]
    fn reads_capture_time_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, fixtures::jpeg_with_exif("2019:07:04 21:30:00", b"x")).unwrap();

        let dt = capture_time(&path).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2019-07-04");
    }

    #[test]
    fn reads_capture_time_from_memory() {
        let bytes = fixtures::jpeg_with_exif("2020:02:29 12:00:00", b"");
        let dt = capture_time_from(&mut Cursor::new(bytes), Path::new("mem.jpg")).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2020-02-29");
    }

    #[test]
    fn jpeg_without_exif_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        fs::write(&path, fixtures::jpeg_without_exif()).unwrap();

        let err = capture_time(&path).unwrap_err();
        assert!(err.to_string().contains("plain.jpg"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = capture_time(Path::new("/nonexistent/photo.jpg")).unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }
}
