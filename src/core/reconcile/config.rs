//! Run configuration and its validating builder.

use crate::core::pool::PoolConfig;
use crate::core::scanner::MediaFilter;
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What happens to new source files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Copy files into the destination (keep originals)
    #[default]
    Copy,
    /// Move files into the destination
    Move,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "copy"),
            TransferMode::Move => write!(f, "move"),
        }
    }
}

/// Validated configuration of one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    sources: Vec<PathBuf>,
    destination: PathBuf,
    mode: TransferMode,
    filter: MediaFilter,
    no_sooc: bool,
    pool: PoolConfig,
}

impl ReconcileConfig {
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::new()
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    /// Place camera JPEGs next to raw files instead of in `sooc/`
    pub fn no_sooc(&self) -> bool {
        self.no_sooc
    }

    pub fn pool(&self) -> PoolConfig {
        self.pool
    }
}

/// Builder for [`ReconcileConfig`]
#[derive(Debug, Default)]
pub struct ReconcileConfigBuilder {
    sources: Vec<PathBuf>,
    destination: Option<PathBuf>,
    mode: TransferMode,
    filter: MediaFilter,
    no_sooc: bool,
    pool: Option<PoolConfig>,
}

impl ReconcileConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one source directory
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Add several source directories
    pub fn sources<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn filter(mut self, filter: MediaFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn no_sooc(mut self, no_sooc: bool) -> Self {
        self.no_sooc = no_sooc;
        self
    }

    /// Override worker count and queue capacity
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ReconcileConfig> {
        if self.sources.is_empty() {
            return Err(ReconcileError::Config(
                "at least one source directory is required".to_string(),
            ));
        }

        for source in &self.sources {
            if !source.is_dir() {
                return Err(ReconcileError::Config(format!(
                    "source '{}' is not a directory",
                    source.display()
                )));
            }
        }

        let destination = self.destination.ok_or_else(|| {
            ReconcileError::Config("a destination directory is required".to_string())
        })?;

        if !destination.is_dir() {
            return Err(ReconcileError::Config(format!(
                "destination '{}' is not a directory",
                destination.display()
            )));
        }

        if self.sources.iter().any(|s| same_directory(s, &destination)) {
            return Err(ReconcileError::Config(format!(
                "destination '{}' is also listed as a source",
                destination.display()
            )));
        }

        if self.filter.is_empty() {
            return Err(ReconcileError::Config(
                "media filter must include at least one type".to_string(),
            ));
        }

        let pool = self.pool.unwrap_or_default();
        if pool.workers == 0 || pool.queue_capacity == 0 {
            return Err(ReconcileError::Config(
                "worker count and queue capacity must be positive".to_string(),
            ));
        }

        Ok(ReconcileConfig {
            sources: self.sources,
            destination,
            mode: self.mode,
            filter: self.filter,
            no_sooc: self.no_sooc,
            pool,
        })
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::MediaKind;
    use tempfile::TempDir;

    #[test]
    fn builds_with_defaults() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let config = ReconcileConfig::builder()
            .source(src.path())
            .destination(dest.path())
            .build()
            .unwrap();

        assert_eq!(config.sources(), &[src.path().to_path_buf()]);
        assert_eq!(config.mode(), TransferMode::Copy);
        assert_eq!(config.filter(), &MediaFilter::all());
        assert!(!config.no_sooc());
        assert_eq!(config.pool(), PoolConfig::default());
    }

    #[test]
    fn keeps_every_option() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let config = ReconcileConfig::builder()
            .sources([a.path(), b.path()])
            .destination(dest.path())
            .mode(TransferMode::Move)
            .filter(MediaFilter::only([MediaKind::Raf]))
            .no_sooc(true)
            .pool(PoolConfig {
                workers: 3,
                queue_capacity: 7,
            })
            .build()
            .unwrap();

        assert_eq!(config.sources().len(), 2);
        assert_eq!(config.mode(), TransferMode::Move);
        assert!(config.filter().contains(MediaKind::Raf));
        assert!(!config.filter().contains(MediaKind::Jpg));
        assert!(config.no_sooc());
        assert_eq!(config.pool().workers, 3);
    }

    #[test]
    fn requires_a_source() {
        let dest = TempDir::new().unwrap();
        let err = ReconcileConfig::builder()
            .destination(dest.path())
            .build()
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Config(_)));
    }

    #[test]
    fn rejects_missing_directories() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let err = ReconcileConfig::builder()
            .source(&missing)
            .destination(dir.path())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("is not a directory"));

        let err = ReconcileConfig::builder()
            .source(dir.path())
            .destination(&missing)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn rejects_destination_listed_as_source() {
        let dir = TempDir::new().unwrap();
        let err = ReconcileConfig::builder()
            .source(dir.path())
            .destination(dir.path())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("also listed as a source"));
    }
}
