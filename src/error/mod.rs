//! # Error Module
//!
//! Error types for the media reconciler.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every error names the file or directory involved
//! - **Terminal, not retried** - bad metadata and I/O failures abort the run
//!
//! Conflicts between destination files are not errors: they are reported
//! through the plan and gate execution instead.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("error occurred while scanning source directory '{root}': {source}")]
    ScanSource {
        root: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("error occurred while scanning destination directory '{root}': {source}")]
    ScanDestination {
        root: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("error occurred while computing destination path: {0}")]
    Resolve(#[from] MetadataError),

    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    #[error("plan creation interrupted")]
    Interrupted,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while computing a content fingerprint
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("failed to open file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to get file info for {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read first chunk of {path}: {source}")]
    ReadFirst {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to seek to last chunk of {path}: {source}")]
    Seek {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read last chunk of {path}: {source}")]
    ReadLast {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while deriving a capture date from file content.
///
/// `Clone` because a record memoizes the outcome of its first
/// extraction and hands the same result to every later caller.
#[derive(Error, Debug, Clone)]
pub enum MetadataError {
    #[error("{path}: failed to read file: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("{path}: exif data not found")]
    ExifNotFound { path: PathBuf },

    #[error("{path}: failed to decode exif data: {reason}")]
    ExifDecode { path: PathBuf, reason: String },

    #[error("{path}: invalid capture timestamp '{value}'")]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("{path}: failed to read RAF header: {source}")]
    RafHeader {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("{path}: failed to read embedded JPEG: {reason}")]
    RafJpeg { path: PathBuf, reason: String },

    #[error("{path}: invalid atom size {size}")]
    InvalidAtomSize { path: PathBuf, size: u32 },

    #[error("{path}: movie resource atom (moov) not found")]
    MovieResourceNotFound { path: PathBuf },

    #[error("{path}: compressed video is not supported")]
    CompressedMovie { path: PathBuf },

    #[error("{path}: reference video is not supported")]
    ReferenceMovie { path: PathBuf },

    #[error("{path}: did not find movie header atom (mvhd), found '{found}'")]
    MovieHeaderNotFound { path: PathBuf, found: String },

    #[error("{path}: creation time not set")]
    CreationTimeNotSet { path: PathBuf },
}

impl MetadataError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        MetadataError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Errors that occur while discovering and fingerprinting media
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("unsupported media type: {path}")]
    UnsupportedMedia { path: PathBuf },

    #[error("error calculating partial hash: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors that occur while executing plan actions
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("copy verification failed for {path}: source {expected} bytes, destination {actual} bytes")]
    VerificationFailed {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("unresolved conflict between {} files", .paths.len())]
    UnresolvedConflict { paths: Vec<PathBuf> },
}

impl ApplyError {
    pub(crate) fn io(operation: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        ApplyError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ReconcileError>;
