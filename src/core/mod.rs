//! # Core Module
//!
//! The front-end-agnostic reconciliation engine.
//!
//! ## Modules
//! - `fingerprint` - Partial-content SHA-256 identity of a file
//! - `media` - Media kinds, capture-date extraction, canonical destinations
//! - `pool` - Bounded worker pool with progress and cancellation
//! - `scanner` - Discovers and fingerprints media under a root
//! - `reconcile` - Builds and executes the reconciliation plan

pub mod fingerprint;
pub mod media;
pub mod pool;
pub mod reconcile;
pub mod scanner;

// Re-export commonly used types
pub use fingerprint::Fingerprint;
pub use media::{MediaKind, MediaRecord};
pub use pool::CancellationToken;
pub use reconcile::{Plan, PlanSummary, ReconcileConfig, Reconciler};
