//! Media type allow-list for the scanner.

use crate::core::media::MediaKind;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Set of media kinds a scan accepts. Defaults to all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    kinds: BTreeSet<MediaKind>,
}

impl MediaFilter {
    /// Accept every supported kind
    pub fn all() -> Self {
        Self {
            kinds: MediaKind::ALL.into_iter().collect(),
        }
    }

    /// Accept only `kinds`
    pub fn only(kinds: impl IntoIterator<Item = MediaKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, kind: MediaKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Check if a file should be scanned, by its lower-cased extension
    pub fn should_include(&self, path: &Path) -> bool {
        MediaKind::from_path(path).is_some_and(|kind| self.contains(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = MediaKind> + '_ {
        self.kinds.iter().copied()
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for MediaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.kinds.iter().map(|k| k.extension()).collect();
        f.write_str(&names.join(","))
    }
}

/// Parses a comma separated list such as `jpg,raf`
impl FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut kinds = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind = MediaKind::from_extension(part)
                .ok_or_else(|| format!("unsupported media type '{part}' (expected jpg, raf or mov)"))?;
            kinds.insert(kind);
        }
        if kinds.is_empty() {
            return Err("filter must name at least one media type".to_string());
        }
        Ok(Self { kinds })
    }
}
