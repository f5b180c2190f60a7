//! The plan and its printable summary.

use super::action::{Action, ActionKind};
use super::config::TransferMode;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Ordered actions produced by one planning run
#[derive(Debug, Clone)]
pub struct Plan {
    id: Uuid,
    mode: TransferMode,
    destination: PathBuf,
    actions: Vec<Action>,
    source_duplicates: Vec<PathBuf>,
}

impl Plan {
    pub fn new(mode: TransferMode, destination: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            destination: destination.into(),
            actions: Vec::new(),
            source_duplicates: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub(crate) fn set_source_duplicates(&mut self, paths: Vec<PathBuf>) {
        self.source_duplicates = paths;
    }

    /// Actions in execution order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Source files dropped because identical content was seen earlier
    pub fn source_duplicates(&self) -> &[PathBuf] {
        &self.source_duplicates
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }

    pub fn has_conflicts(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Conflict)
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary {
            plan_id: self.id,
            mode: self.mode,
            skips: Vec::new(),
            copies: Vec::new(),
            moves: Vec::new(),
            conflicts: Vec::new(),
            source_duplicates: self.source_duplicates.len(),
        };

        for action in &self.actions {
            let line = action.summary();
            match action.kind() {
                ActionKind::Skip => summary.skips.push(line),
                ActionKind::Copy => summary.copies.push(line),
                ActionKind::Move => summary.moves.push(line),
                ActionKind::Conflict => summary.conflicts.push(line),
            }
        }

        summary
    }
}

/// Grouped action descriptions with counts.
///
/// `Display` renders the "Detailed Actions" and "Plan Summary" blocks.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub plan_id: Uuid,
    pub mode: TransferMode,
    pub skips: Vec<String>,
    pub copies: Vec<String>,
    pub moves: Vec<String>,
    pub conflicts: Vec<String>,
    pub source_duplicates: usize,
}

impl PlanSummary {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn total_actions(&self) -> usize {
        self.skips.len() + self.copies.len() + self.moves.len() + self.conflicts.len()
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detailed Actions:")?;
        for line in self
            .skips
            .iter()
            .chain(&self.copies)
            .chain(&self.moves)
            .chain(&self.conflicts)
        {
            writeln!(f, "  {line}")?;
        }

        writeln!(f)?;
        writeln!(f, "Plan Summary:")?;
        writeln!(f, "  Files to move: {}", self.moves.len())?;
        writeln!(f, "  Files to copy: {}", self.copies.len())?;
        writeln!(f, "  Files skipped: {}", self.skips.len())?;
        if self.source_duplicates > 0 {
            writeln!(f, "  Duplicate source files ignored: {}", self.source_duplicates)?;
        }
        if self.has_conflicts() {
            writeln!(
                f,
                "  Detected conflicts: {} (will prevent execution of plan and reported actions might be incorrect)",
                self.conflicts.len()
            )
        } else {
            writeln!(f, "  Detected conflicts: 0")
        }
    }
}
