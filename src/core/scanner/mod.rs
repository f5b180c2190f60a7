//! # Scanner Module
//!
//! Discovers media files under a root and fingerprints them on the
//! worker pool.
//!
//! ## Supported Formats
//! - JPEG (`.jpg`)
//! - Fujifilm raw (`.raf`)
//! - QuickTime (`.mov`)
//!
//! Extensions are matched case-insensitively. The walk runs on the calling
//! thread and feeds the pool's bounded queue; the first walk or fingerprint
//! error stops the scan.
//!
//! ## Example
//! ```rust,ignore
//! let pool = WorkerPool::new(PoolConfig::default(), cancel);
//! let scanner = Scanner::new(&pool, MediaFilter::default(), false);
//! let records = scanner.scan(Path::new("/Volumes/card"), ScanRole::Source, &events)?;
//! ```

mod filter;
mod walker;

pub use filter::MediaFilter;

use crate::core::fingerprint::fingerprint;
use crate::core::media::{MediaKind, MediaRecord};
use crate::core::pool::{PoolError, WorkerPool};
use crate::error::ScanError;
use crate::events::{Event, EventSender, Phase, ScanEvent, ScanRole};
use std::path::{Path, PathBuf};

/// Walks a tree and turns every accepted file into a [`MediaRecord`]
pub struct Scanner<'a> {
    pool: &'a WorkerPool,
    filter: MediaFilter,
    no_sooc: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(pool: &'a WorkerPool, filter: MediaFilter, no_sooc: bool) -> Self {
        Self {
            pool,
            filter,
            no_sooc,
        }
    }

    /// Scan `root`, returning its records sorted by path
    pub fn scan(
        &self,
        root: &Path,
        role: ScanRole,
        events: &EventSender,
    ) -> Result<Vec<MediaRecord>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
            role,
        }));

        let no_sooc = self.no_sooc;
        let mut discovered = 0;

        let outcome = self.pool.run(
            Phase::Fingerprinting,
            events,
            |queue| {
                discovered = walker::walk_media(root, &self.filter, |path| queue.enqueue(path))?;
                tracing::info!(root = %root.display(), %role, files = discovered, "Scanning");
                Ok(())
            },
            |path: PathBuf| build_record(path, no_sooc),
        );

        events.send(Event::Scan(ScanEvent::Discovered {
            root: root.to_path_buf(),
            role,
            files: discovered,
        }));

        let mut records = match outcome {
            Ok(records) => records,
            Err(PoolError::Cancelled) => return Err(ScanError::Cancelled),
            Err(PoolError::Failed(e)) => return Err(e),
        };
        records.sort_by(|a, b| a.path().cmp(b.path()));

        events.send(Event::Scan(ScanEvent::Completed {
            root: root.to_path_buf(),
            role,
            records: records.len(),
        }));

        Ok(records)
    }
}

fn build_record(path: PathBuf, no_sooc: bool) -> Result<MediaRecord, ScanError> {
    let kind = MediaKind::from_path(&path)
        .ok_or_else(|| ScanError::UnsupportedMedia { path: path.clone() })?;
    let fingerprint = fingerprint(&path)?;
    tracing::debug!(path = %path.display(), %kind, %fingerprint, "Fingerprinted");
    Ok(MediaRecord::new(path, kind, fingerprint, no_sooc))
}
