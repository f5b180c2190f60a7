//! # Reconcile Module
//!
//! Turns scanned source and destination trees into a [`Plan`] of
//! filesystem actions, and executes it.
//!
//! Identity is content, not name: a renamed copy of an organized file is
//! skipped, and a file whose content appears more than once in the
//! destination blocks the whole plan until it is resolved by hand.
//!
//! ## Example
//! ```rust,ignore
//! let config = ReconcileConfig::builder()
//!     .source("/Volumes/card/DCIM")
//!     .destination("/Users/me/Pictures/library")
//!     .build()?;
//!
//! let reconciler = Reconciler::new(config, CancellationToken::new());
//! let plan = reconciler.plan(&events)?;
//! println!("{}", plan.summary());
//! let report = reconciler.apply(&plan, &events)?;
//! ```

mod action;
mod config;
mod executor;
mod index;
mod plan;
mod planner;
mod transfer;

pub use action::{Action, ActionKind, ConflictReason};
pub use config::{ReconcileConfig, ReconcileConfigBuilder, TransferMode};
pub use executor::{apply, ApplyOutcome, ApplyReport};
pub use index::{DestinationIndex, SourceIndex};
pub use plan::{Plan, PlanSummary};
pub use planner::build_plan;
pub use transfer::{copy_fresh, move_file};

use crate::core::pool::CancellationToken;
use crate::error::Result;
use crate::events::EventSender;

/// One reconciliation run: a configuration bound to a cancellation token
pub struct Reconciler {
    config: ReconcileConfig,
    cancel: CancellationToken,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Scan both sides and build the plan
    pub fn plan(&self, events: &EventSender) -> Result<Plan> {
        build_plan(&self.config, &self.cancel, events)
    }

    /// Execute a plan built by [`Reconciler::plan`]
    pub fn apply(&self, plan: &Plan, events: &EventSender) -> Result<ApplyReport> {
        Ok(apply(plan, &self.cancel, events)?)
    }
}
