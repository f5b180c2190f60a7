//! # Media Module
//!
//! Classifies discovered files and derives where each one belongs in the
//! organized tree.
//!
//! ## Layout
//! ```text
//! <dest>/photos/<YYYY>/<YYYY-MM-DD>[/sooc]/<original-filename>
//! <dest>/videos/<YYYY>/<YYYY-MM-DD>/<original-filename>
//! ```
//!
//! ## Extractors
//! - `jpeg` - EXIF straight from the image stream
//! - `raf` - EXIF from the preview JPEG embedded in a Fujifilm RAF file
//! - `mov` - creation time from the QuickTime `mvhd` atom
//!
//! The destination of a record is computed lazily, at most once, and the
//! same result (or error) is returned to every caller afterwards.

mod jpeg;
mod mov;
mod raf;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::core::fingerprint::Fingerprint;
use crate::error::MetadataError;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SOOC_FOLDER: &str = "sooc";

/// The three supported media types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Camera JPEG
    Jpg,
    /// Fujifilm raw image
    Raf,
    /// QuickTime video
    Mov,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Jpg, MediaKind::Raf, MediaKind::Mov];

    /// Detect the media kind from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" => Some(MediaKind::Jpg),
            "raf" => Some(MediaKind::Raf),
            "mov" => Some(MediaKind::Mov),
            _ => None,
        }
    }

    /// Detect the media kind of a path from its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Jpg => "jpg",
            MediaKind::Raf => "raf",
            MediaKind::Mov => "mov",
        }
    }

    /// Top-level folder under the destination root
    pub fn category(&self) -> MediaCategory {
        match self {
            MediaKind::Jpg | MediaKind::Raf => MediaCategory::Photos,
            MediaKind::Mov => MediaCategory::Videos,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Top-level folder of the organized tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaCategory {
    Photos,
    Videos,
}

impl MediaCategory {
    pub fn folder(&self) -> &'static str {
        match self {
            MediaCategory::Photos => "photos",
            MediaCategory::Videos => "videos",
        }
    }
}

/// Date-derived part of a destination path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationFragment {
    /// Four-digit year, e.g. `2024`
    pub year: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Optional folder below the date folder (`sooc` for camera JPEGs)
    pub subfolder: Option<&'static str>,
}

impl DestinationFragment {
    pub fn from_datetime(taken: NaiveDateTime, subfolder: Option<&'static str>) -> Self {
        Self {
            year: format!("{:04}", taken.year()),
            date: taken.format("%Y-%m-%d").to_string(),
            subfolder,
        }
    }

    /// Path relative to the destination root
    pub fn relative_path(&self, category: MediaCategory, file_name: &Path) -> PathBuf {
        let mut path = PathBuf::from(category.folder());
        path.push(&self.year);
        path.push(&self.date);
        if let Some(sub) = self.subfolder {
            path.push(sub);
        }
        path.push(file_name);
        path
    }
}

/// Derive the destination fragment of a file of the given kind
pub fn destination_fragment(
    kind: MediaKind,
    path: &Path,
    no_sooc: bool,
) -> Result<DestinationFragment, MetadataError> {
    match kind {
        MediaKind::Jpg => {
            let taken = jpeg::capture_time(path)?;
            let subfolder = if no_sooc { None } else { Some(SOOC_FOLDER) };
            Ok(DestinationFragment::from_datetime(taken, subfolder))
        }
        MediaKind::Raf => {
            let taken = raf::capture_time(path)?;
            Ok(DestinationFragment::from_datetime(taken, None))
        }
        MediaKind::Mov => {
            let created = mov::creation_time(path)?;
            Ok(DestinationFragment::from_datetime(created, None))
        }
    }
}

/// One discovered media file.
///
/// Path, kind and fingerprint are fixed at construction. The destination
/// is resolved on first request and memoized: concurrent callers block on
/// the single in-flight computation and all observe its outcome.
#[derive(Debug)]
pub struct MediaRecord {
    path: PathBuf,
    kind: MediaKind,
    fingerprint: Fingerprint,
    no_sooc: bool,
    relative_destination: OnceLock<Result<PathBuf, MetadataError>>,
}

impl MediaRecord {
    pub fn new(path: PathBuf, kind: MediaKind, fingerprint: Fingerprint, no_sooc: bool) -> Self {
        Self {
            path,
            kind,
            fingerprint,
            no_sooc,
            relative_destination: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Canonical location of this file under `root`.
    ///
    /// Only the content-derived part is cached, so the result is a pure
    /// function of the file content and `root`.
    pub fn destination_path(&self, root: &Path) -> Result<PathBuf, MetadataError> {
        let relative = self.relative_destination.get_or_init(|| {
            let file_name = self
                .path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
            destination_fragment(self.kind, &self.path, self.no_sooc)
                .map(|fragment| fragment.relative_path(self.kind.category(), &file_name))
        });

        match relative {
            Ok(relative) => Ok(root.join(relative)),
            Err(e) => Err(e.clone()),
        }
    }

    /// Whether the destination has already been resolved
    pub fn is_resolved(&self) -> bool {
        self.relative_destination.get().is_some()
    }
}
