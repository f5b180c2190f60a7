//! Filesystem primitives used by plan execution.
//!
//! Neither primitive ever replaces an existing file.

use crate::error::ApplyError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<(), ApplyError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ApplyError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Copy `source` to a newly created `destination` and sync it.
///
/// Fails with [`ApplyError::DestinationExists`] if `destination` is
/// already present. A partially written destination is removed.
pub fn copy_fresh(source: &Path, destination: &Path) -> Result<u64, ApplyError> {
    let mut reader = File::open(source).map_err(|e| ApplyError::io("open source file", source, e))?;
    ensure_parent(destination)?;

    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ApplyError::DestinationExists {
                path: destination.to_path_buf(),
            },
            _ => ApplyError::io("create destination file", destination, e),
        })?;

    let written = io::copy(&mut reader, &mut writer)
        .and_then(|n| writer.sync_all().map(|_| n))
        .map_err(|e| {
            let _ = fs::remove_file(destination);
            ApplyError::io("copy content to", destination, e)
        })?;

    Ok(written)
}

/// Move `source` to `destination`.
///
/// Renames when possible; when the rename fails (typically across
/// filesystems) the file is copied, its size verified and the source
/// removed.
pub fn move_file(source: &Path, destination: &Path) -> Result<(), ApplyError> {
    if destination.exists() {
        return Err(ApplyError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }
    ensure_parent(destination)?;

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            tracing::debug!(
                source = %source.display(),
                error = %rename_error,
                "Rename failed, falling back to copy"
            );
            let expected = fs::metadata(source)
                .map_err(|e| ApplyError::io("read metadata of", source, e))?
                .len();
            copy_fresh(source, destination)?;

            let actual = fs::metadata(destination)
                .map_err(|e| ApplyError::io("read metadata of", destination, e))?
                .len();
            if actual != expected {
                let _ = fs::remove_file(destination);
                return Err(ApplyError::VerificationFailed {
                    path: destination.to_path_buf(),
                    expected,
                    actual,
                });
            }

            fs::remove_file(source).map_err(|e| ApplyError::io("remove source file", source, e))
        }
    }
}
