//! # Media Reconciler
//!
//! Reconciles unorganized camera media against an organized library,
//! identifying files by content rather than by name.
//!
//! ## Core Philosophy
//! - **Plan before touching anything** - every run builds a full plan first
//! - **Never overwrite** - transfers only ever create new files
//! - **Conflicts block** - duplicate content already in the library must be
//!   resolved by hand before anything is applied
//!
//! ## Architecture
//! - `core` - Fingerprinting, metadata extraction, scanning, planning
//! - `events` - Event-driven progress reporting
//! - `error` - Error types naming the offending path

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ReconcileError, Result};

/// Initialize tracing for the library.
///
/// Honors `RUST_LOG`; logs nothing below `warn` otherwise. Should be called
/// by the application entry point.
pub fn init_tracing() {
    init_tracing_with("warn");
}

/// Initialize tracing, falling back to `default_directive` when `RUST_LOG`
/// is unset or invalid. A second call is a no-op.
pub fn init_tracing_with(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
