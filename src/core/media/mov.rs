//! QuickTime creation time.
//!
//! A `.mov` file is a sequence of atoms, each starting with a 4-byte
//! big-endian size (header included) and a 4-byte type. The top-level
//! `moov` atom holds the movie metadata and its first child is normally the
//! `mvhd` movie header:
//!
//! ```text
//! mvhd payload: version(1) flags(3) creation_time(4, or 8 when version == 1) ...
//! ```
//!
//! Creation time counts seconds since 1904-01-01 (Apple epoch).

use crate::error::MetadataError;
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Seconds between 1904-01-01 and 1970-01-01
pub const APPLE_EPOCH_ADJUSTMENT: i64 = 2_082_844_800;

const MOVIE_RESOURCE_ATOM: &[u8; 4] = b"moov";
const MOVIE_HEADER_ATOM: &[u8; 4] = b"mvhd";
const COMPRESSED_MOVIE_ATOM: &[u8; 4] = b"cmov";
const REFERENCE_MOVIE_ATOM: &[u8; 4] = b"rmra";

const ATOM_HEADER_LEN: u32 = 8;

struct AtomHeader {
    size: u32,
    kind: [u8; 4],
}

fn read_atom_header<R: Read>(reader: &mut R) -> std::io::Result<AtomHeader> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(AtomHeader {
        size: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
        kind: [buf[4], buf[5], buf[6], buf[7]],
    })
}

/// Read the creation time of the movie at `path`, in local time
pub(super) fn creation_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let file = File::open(path).map_err(|e| MetadataError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let io_err = |e: std::io::Error| MetadataError::io(path, e);

    // Walk top-level atoms until moov.
    loop {
        let header = match read_atom_header(&mut reader) {
            Ok(header) => header,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(MetadataError::MovieResourceNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(io_err(e)),
        };

        if &header.kind == MOVIE_RESOURCE_ATOM {
            break;
        }

        if header.size < ATOM_HEADER_LEN {
            return Err(MetadataError::InvalidAtomSize {
                path: path.to_path_buf(),
                size: header.size,
            });
        }

        reader
            .seek(SeekFrom::Current(i64::from(header.size - ATOM_HEADER_LEN)))
            .map_err(io_err)?;
    }

    let child = read_atom_header(&mut reader).map_err(io_err)?;

    match &child.kind {
        MOVIE_HEADER_ATOM => {
            let mut version_flags = [0u8; 4];
            reader.read_exact(&mut version_flags).map_err(io_err)?;

            let raw = if version_flags[0] == 1 {
                let mut buf = [0u8; 8];
                reader.read_exact(&mut buf).map_err(io_err)?;
                u64::from_be_bytes(buf)
            } else {
                let mut buf = [0u8; 4];
                reader.read_exact(&mut buf).map_err(io_err)?;
                u64::from(u32::from_be_bytes(buf))
            };

            if raw == 0 {
                return Err(MetadataError::CreationTimeNotSet {
                    path: path.to_path_buf(),
                });
            }

            apple_to_local(raw).ok_or_else(|| MetadataError::InvalidTimestamp {
                path: path.to_path_buf(),
                value: raw.to_string(),
            })
        }
        COMPRESSED_MOVIE_ATOM => Err(MetadataError::CompressedMovie {
            path: path.to_path_buf(),
        }),
        REFERENCE_MOVIE_ATOM => Err(MetadataError::ReferenceMovie {
            path: path.to_path_buf(),
        }),
        other => Err(MetadataError::MovieHeaderNotFound {
            path: path.to_path_buf(),
            found: String::from_utf8_lossy(other).into_owned(),
        }),
    }
}

/// Convert Apple-epoch seconds to a local wall-clock time
fn apple_to_local(seconds: u64) -> Option<NaiveDateTime> {
    let unix = i64::try_from(seconds).ok()? - APPLE_EPOCH_ADJUSTMENT;
    let utc = DateTime::from_timestamp(unix, 0)?;
    Some(utc.with_timezone(&Local).naive_local())
}
