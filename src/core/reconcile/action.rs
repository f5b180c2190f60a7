//! Plan actions.

use super::transfer;
use crate::core::media::MediaRecord;
use crate::error::ApplyError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Discriminant of an [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Copy,
    Skip,
    Conflict,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Move => write!(f, "move"),
            ActionKind::Copy => write!(f, "copy"),
            ActionKind::Skip => write!(f, "skip"),
            ActionKind::Conflict => write!(f, "conflict"),
        }
    }
}

/// Why a set of files can not be reconciled automatically
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// Several destination files share one fingerprint
    SharedContent,
    /// Files with different content would be placed at this path
    SameDestination(PathBuf),
}

/// One planned step.
///
/// The variant is fixed when the planner creates the action; the
/// filesystem effect only happens in [`Action::execute`].
#[derive(Debug, Clone)]
pub enum Action {
    /// Rename `record` to its canonical location under `root`
    Move {
        record: Arc<MediaRecord>,
        root: PathBuf,
    },
    /// Copy `record` to its canonical location under `root`
    Copy {
        record: Arc<MediaRecord>,
        root: PathBuf,
    },
    /// `source` content already lives at `existing`
    Skip {
        source: Arc<MediaRecord>,
        existing: Arc<MediaRecord>,
    },
    /// Files that block execution of the whole plan
    Conflict {
        reason: ConflictReason,
        records: Vec<Arc<MediaRecord>>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Copy { .. } => ActionKind::Copy,
            Action::Skip { .. } => ActionKind::Skip,
            Action::Conflict { .. } => ActionKind::Conflict,
        }
    }

    /// One-line description used in the plan summary
    pub fn summary(&self) -> String {
        match self {
            Action::Move { record, .. } => format!("Move: {}", record.path().display()),
            Action::Copy { record, .. } => format!("Copy: {}", record.path().display()),
            Action::Skip { source, existing } => format!(
                "Skip: {} (already exists at {})",
                source.path().display(),
                existing.path().display()
            ),
            Action::Conflict { reason, records } => {
                let paths: Vec<String> = records
                    .iter()
                    .map(|r| r.path().display().to_string())
                    .collect();
                match reason {
                    ConflictReason::SharedContent => format!(
                        "Conflict: {} files share the same content: {}",
                        records.len(),
                        paths.join(", ")
                    ),
                    ConflictReason::SameDestination(target) => format!(
                        "Conflict: {} files would be placed at {}: {}",
                        records.len(),
                        target.display(),
                        paths.join(", ")
                    ),
                }
            }
        }
    }

    /// Perform the action and describe what was done.
    ///
    /// A conflict can not be executed and yields
    /// [`ApplyError::UnresolvedConflict`].
    pub fn execute(&self) -> Result<String, ApplyError> {
        match self {
            Action::Move { record, root } => {
                let destination = record.destination_path(root)?;
                transfer::move_file(record.path(), &destination)?;
                Ok(format!(
                    "Moving from {} to {}",
                    record.path().display(),
                    destination.display()
                ))
            }
            Action::Copy { record, root } => {
                let destination = record.destination_path(root)?;
                transfer::copy_fresh(record.path(), &destination)?;
                Ok(format!(
                    "Copying from {} to {}",
                    record.path().display(),
                    destination.display()
                ))
            }
            Action::Skip { source, .. } => Ok(format!("Skipping {}", source.path().display())),
            Action::Conflict { records, .. } => Err(ApplyError::UnresolvedConflict {
                paths: records.iter().map(|r| r.path().to_path_buf()).collect(),
            }),
        }
    }
}
