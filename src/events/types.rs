//! Event type definitions.

use crate::core::reconcile::PlanSummary;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Everything the engine reports while it runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Event {
    /// Directory scans
    Scan(ScanEvent),
    /// Throttled progress of a pooled phase
    Progress(PhaseProgress),
    /// Plan construction
    Plan(PlanEvent),
    /// Plan execution
    Apply(ApplyEvent),
}

/// Which side of the reconciliation a scanned root belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanRole {
    Source,
    Destination,
}

impl fmt::Display for ScanRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanRole::Source => write!(f, "source"),
            ScanRole::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEvent {
    Started { root: PathBuf, role: ScanRole },
    /// Enumeration finished; `files` regular files were queued
    Discovered {
        root: PathBuf,
        role: ScanRole,
        files: usize,
    },
    Completed {
        root: PathBuf,
        role: ScanRole,
        records: usize,
    },
}

/// Phases that run on the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Fingerprinting,
    Resolving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fingerprinting => write!(f, "Fingerprinting"),
            Phase::Resolving => write!(f, "Resolving destinations"),
        }
    }
}

/// One progress report, emitted at most every 20%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub processed: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanEvent {
    /// Destination resolution is starting for `files` records
    Resolving { files: usize },
    Built { summary: PlanSummary },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyEvent {
    Started { actions: usize },
    ActionApplied { index: usize, message: String },
    /// The plan held conflicts and nothing was touched
    Refused { conflicts: usize },
    /// Cancellation stopped execution between actions
    Interrupted { applied: usize, remaining: usize },
    Completed { applied: usize },
}
