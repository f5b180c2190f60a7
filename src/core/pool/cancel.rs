//! Cooperative cancellation shared by every phase of a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A run-scoped stop signal.
///
/// Raising it never interrupts work in flight; queues, workers and the
/// executor check it before starting anything new.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
