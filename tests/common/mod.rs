//! Shared setup for end-to-end tests.
#![allow(dead_code)]

// Same byte-level builders the unit tests use.
#[path = "../../src/core/media/fixtures.rs"]
mod fixtures;

pub use fixtures::{
    jpeg_with_exif as jpeg, mov_with_creation_time as mov, raf_with_exif as raf,
};

use media_reconciler::core::pool::{CancellationToken, PoolConfig};
use media_reconciler::core::reconcile::{ReconcileConfig, TransferMode};
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use std::path::Path;

/// Write `bytes` to `child`, creating its parent directories
pub fn write(child: &ChildPath, bytes: &[u8]) {
    if let Some(parent) = child.path().parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    child.write_binary(bytes).unwrap();
}

pub fn config(sources: &[&Path], dest: &Path, mode: TransferMode) -> ReconcileConfig {
    ReconcileConfig::builder()
        .sources(sources.iter().copied())
        .destination(dest)
        .mode(mode)
        .pool(PoolConfig {
            workers: 4,
            queue_capacity: 8,
        })
        .build()
        .unwrap()
}

pub fn token() -> CancellationToken {
    CancellationToken::new()
}
