//! Directory enumeration using walkdir.

use super::filter::MediaFilter;
use crate::core::pool::Halted;
use crate::error::ScanError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `root` and hand every file accepted by `filter` to `submit`.
///
/// Enumeration stops at the first walk error, or as soon as `submit`
/// reports that the pool no longer accepts work. Returns the number of
/// files submitted.
pub(super) fn walk_media<F>(root: &Path, filter: &MediaFilter, mut submit: F) -> Result<usize, ScanError>
where
    F: FnMut(PathBuf) -> Result<(), Halted>,
{
    let mut submitted = 0;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(root, e))?;

        if entry.file_type().is_dir() {
            continue;
        }
        if !filter.should_include(entry.path()) {
            continue;
        }

        if submit(entry.into_path()).is_err() {
            break;
        }
        submitted += 1;
    }

    Ok(submitted)
}

fn walk_error(root: &Path, error: walkdir::Error) -> ScanError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    match error.io_error().map(|e| e.kind()) {
        Some(ErrorKind::PermissionDenied) => ScanError::PermissionDenied { path },
        Some(ErrorKind::NotFound) if path == root => ScanError::DirectoryNotFound { path },
        _ => ScanError::Walk {
            path,
            reason: error.to_string(),
        },
    }
}
