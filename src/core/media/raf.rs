//! Fujifilm RAF container.
//!
//! The file starts with a fixed big-endian header followed by a directory
//! of `{offset, length}` pairs. The first pair points at a full preview
//! JPEG carrying the camera's EXIF block, which is where the capture time
//! is read from.
//!
//! ```text
//! 0    magic            16 bytes  "FUJIFILMCCD-RAW "
//! 16   format version    4 bytes
//! 20   camera id         8 bytes
//! 28   camera name      32 bytes
//! 60   dir version       4 bytes
//! 64   reserved         20 bytes
//! 84   jpeg offset/len   2 x i32
//! 92   cfa header        2 x i32
//! 100  cfa data          2 x i32
//! ```

use super::jpeg;
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

pub(super) const HEADER_LEN: usize = 108;

/// A region of the file described by the RAF directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Region {
    pub offset: i32,
    pub length: i32,
}

/// Parsed fixed-layout RAF header
#[derive(Debug, Clone)]
pub(super) struct RafHeader {
    pub magic: [u8; 16],
    pub format_version: [u8; 4],
    pub camera_id: [u8; 8],
    pub camera: [u8; 32],
    pub dir_version: [u8; 4],
    pub jpeg: Region,
    pub cfa_header: Region,
    pub cfa: Region,
}

impl RafHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            magic: take(bytes, 0),
            format_version: take(bytes, 16),
            camera_id: take(bytes, 20),
            camera: take(bytes, 28),
            dir_version: take(bytes, 60),
            jpeg: region(bytes, 84),
            cfa_header: region(bytes, 92),
            cfa: region(bytes, 100),
        }
    }

    /// Camera name with NUL padding removed
    pub fn camera_name(&self) -> String {
        String::from_utf8_lossy(&self.camera)
            .trim_end_matches('\0')
            .to_string()
    }
}

fn take<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

fn region(bytes: &[u8], at: usize) -> Region {
    Region {
        offset: i32::from_be_bytes(take(bytes, at)),
        length: i32::from_be_bytes(take(bytes, at + 4)),
    }
}

/// Read the capture time from the preview JPEG of the RAF at `path`
pub(super) fn capture_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let mut file = File::open(path).map_err(|e| MetadataError::io(path, e))?;

    let mut raw = [0u8; HEADER_LEN];
    file.read_exact(&mut raw)
        .map_err(|e| MetadataError::RafHeader {
            path: path.to_path_buf(),
            source: std::sync::Arc::new(e),
        })?;
    let header = RafHeader::parse(&raw);

    tracing::trace!(
        path = %path.display(),
        camera = %header.camera_name(),
        camera_id = ?header.camera_id,
        format_version = %String::from_utf8_lossy(&header.format_version),
        dir_version = ?header.dir_version,
        jpeg_offset = header.jpeg.offset,
        jpeg_length = header.jpeg.length,
        cfa_header_offset = header.cfa_header.offset,
        cfa_offset = header.cfa.offset,
        cfa_length = header.cfa.length,
        "Parsed RAF header"
    );

    if header.jpeg.offset < 0 || header.jpeg.length <= 0 {
        return Err(MetadataError::RafJpeg {
            path: path.to_path_buf(),
            reason: format!(
                "invalid preview region offset {} length {}",
                header.jpeg.offset, header.jpeg.length
            ),
        });
    }

    let file_len = file.metadata().map_err(|e| MetadataError::io(path, e))?.len();
    let end = header.jpeg.offset as u64 + header.jpeg.length as u64;
    if end > file_len {
        return Err(MetadataError::RafJpeg {
            path: path.to_path_buf(),
            reason: format!("preview region ends at {end}, past end of file ({file_len} bytes)"),
        });
    }

    let mut preview = vec![0u8; header.jpeg.length as usize];
    file.seek(SeekFrom::Start(header.jpeg.offset as u64))
        .and_then(|_| file.read_exact(&mut preview))
        .map_err(|e| MetadataError::RafJpeg {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    jpeg::capture_time_from(&mut Cursor::new(preview), path)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn header_fields_are_big_endian() {
        let bytes = fixtures::raf_with_exif("2023:02:01 08:00:00");
        let mut raw = [0u8; HEADER_LEN];
        raw.copy_from_slice(&bytes[..HEADER_LEN]);

        let header = RafHeader::parse(&raw);

        assert_eq!(&header.magic, b"FUJIFILMCCD-RAW ");
        assert_eq!(header.camera_name(), "X-T5");
        assert_eq!(header.jpeg.offset, HEADER_LEN as i32);
        assert_eq!(header.jpeg.length as usize, bytes.len() - HEADER_LEN);
        assert_eq!(header.cfa_header, Region { offset: 0, length: 0 });
    }

    #[test]
    fn reads_capture_time_from_preview() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DSCF0001.RAF");
        fs::write(&path, fixtures::raf_with_exif("2023:02:01 08:00:00")).unwrap();

        let dt = capture_time(&path).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2023-02-01");
    }

    #[test]
    fn short_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.raf");
        fs::write(&path, b"FUJIFILMCCD-RAW 0201").unwrap();

        let err = capture_time(&path).unwrap_err();
        assert!(matches!(err, MetadataError::RafHeader { .. }));
    }

    #[test]
    fn preview_past_end_of_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("truncated.raf");
        let mut bytes = fixtures::raf_with_exif("2023:02:01 08:00:00");
        bytes.truncate(HEADER_LEN + 10);
        fs::write(&path, bytes).unwrap();

        let err = capture_time(&path).unwrap_err();
        assert!(matches!(err, MetadataError::RafJpeg { .. }));
    }

    #[test]
    fn preview_without_exif_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noexif.raf");
        fs::write(&path, fixtures::raf_containing(&fixtures::jpeg_without_exif())).unwrap();

        assert!(capture_time(&path).is_err());
    }
}
