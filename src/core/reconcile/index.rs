//! Fingerprint indices over scanned records.
//!
//! Both indices are built sequentially after the scan that produced their
//! records has joined; nothing mutates them concurrently.

use crate::core::fingerprint::Fingerprint;
use crate::core::media::MediaRecord;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Source records keyed by fingerprint; the first record seen wins
#[derive(Debug, Default)]
pub struct SourceIndex {
    records: BTreeMap<Fingerprint, Arc<MediaRecord>>,
    dropped: Vec<PathBuf>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its content is already indexed.
    ///
    /// Returns `false` when the record was dropped as a duplicate.
    pub fn insert(&mut self, record: MediaRecord) -> bool {
        if let Some(kept) = self.records.get(record.fingerprint()) {
            tracing::warn!(
                kept = %kept.path().display(),
                dropped = %record.path().display(),
                "Duplicate content in sources, keeping first file"
            );
            self.dropped.push(record.path().to_path_buf());
            return false;
        }
        self.records
            .insert(record.fingerprint().clone(), Arc::new(record));
        true
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Arc<MediaRecord>> {
        self.records.get(fingerprint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &Arc<MediaRecord>)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Paths dropped because their content was already indexed
    pub fn dropped(&self) -> &[PathBuf] {
        &self.dropped
    }
}

impl FromIterator<MediaRecord> for SourceIndex {
    fn from_iter<I: IntoIterator<Item = MediaRecord>>(iter: I) -> Self {
        let mut index = SourceIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

/// Destination records keyed by fingerprint, keeping every record.
///
/// More than one record under a fingerprint means the organized tree
/// already holds duplicate content.
#[derive(Debug, Default)]
pub struct DestinationIndex {
    records: BTreeMap<Fingerprint, Vec<Arc<MediaRecord>>>,
}

impl DestinationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: MediaRecord) {
        self.records
            .entry(record.fingerprint().clone())
            .or_default()
            .push(Arc::new(record));
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[Arc<MediaRecord>]> {
        self.records.get(fingerprint).map(Vec::as_slice)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records.contains_key(fingerprint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &[Arc<MediaRecord>])> {
        self.records.iter().map(|(fp, records)| (fp, records.as_slice()))
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of records, duplicates included
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

impl FromIterator<MediaRecord> for DestinationIndex {
    fn from_iter<I: IntoIterator<Item = MediaRecord>>(iter: I) -> Self {
        let mut index = DestinationIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
