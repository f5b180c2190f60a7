//! # Fingerprint Module
//!
//! Computes a content identifier for a media file without reading all of it.
//!
//! ## How It Works
//! 1. Pick a chunk size from the file size (1 MiB below 100 MiB, otherwise
//!    1% of the file capped at 10 MiB)
//! 2. Hash the first chunk with SHA-256
//! 3. If the file is longer than one chunk, seek to the last chunk and feed
//!    it into the same digest
//! 4. Return the hex digest
//!
//! Two files with identical head and tail chunks are treated as the same
//! content.

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const ONE_MIB: u64 = 1024 * 1024;
const MIN_CHUNK_SIZE: u64 = ONE_MIB;
const MAX_CHUNK_SIZE: u64 = 10 * ONE_MIB;
const PERCENTAGE_THRESHOLD: u64 = 100 * ONE_MIB;

/// Opaque, fixed-length content identifier (64 hex characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chunk size used for a file of `file_size` bytes
pub fn chunk_size(file_size: u64) -> u64 {
    if file_size < PERCENTAGE_THRESHOLD {
        return MIN_CHUNK_SIZE;
    }

    (file_size / 100).min(MAX_CHUNK_SIZE)
}

/// Fingerprint the file at `path` from its first and last chunks
pub fn fingerprint(path: &Path) -> Result<Fingerprint, FingerprintError> {
    let mut file = File::open(path).map_err(|source| FingerprintError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let file_size = file
        .metadata()
        .map_err(|source| FingerprintError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let chunk = chunk_size(file_size);

    let mut hasher = Sha256::new();
    let mut buf = Vec::with_capacity(chunk as usize);

    // A short read here just means the file is smaller than one chunk.
    (&mut file)
        .take(chunk)
        .read_to_end(&mut buf)
        .map_err(|source| FingerprintError::ReadFirst {
            path: path.to_path_buf(),
            source,
        })?;
    hasher.update(&buf);

    if file_size > chunk {
        file.seek(SeekFrom::End(-(chunk as i64)))
            .map_err(|source| FingerprintError::Seek {
                path: path.to_path_buf(),
                source,
            })?;

        buf.clear();
        (&mut file)
            .take(chunk)
            .read_to_end(&mut buf)
            .map_err(|source| FingerprintError::ReadLast {
                path: path.to_path_buf(),
                source,
            })?;
        hasher.update(&buf);
    }

    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();

    Ok(Fingerprint(hex))
}
