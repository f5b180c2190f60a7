//! # Pool Module
//!
//! Bounded-parallelism work distribution used by every concurrent phase.
//!
//! ## Moving Parts
//! - **Job queue** - a bounded channel; producers block once it is full
//! - **Workers** - `2 × available_parallelism` threads draining the queue
//! - **Error slot** - keeps only the first error, later ones are discarded
//! - **Progress** - a [`ProgressAggregator`] owned by the phase, reported
//!   in 20% steps of the final job count by a separate thread
//! - **Cancellation** - checked before every enqueue and before a worker
//!   starts a job; work already running is allowed to finish
//!
//! After the first error the pool stops starting jobs; the remaining queue
//! is drained without processing so blocked producers are released.
//!
//! ## Example
//! ```rust,ignore
//! let pool = WorkerPool::new(PoolConfig::default(), cancel.clone());
//! let lengths = pool.run(Phase::Fingerprinting, &events, |queue| {
//!     for path in paths {
//!         if queue.enqueue(path).is_err() { break; }
//!     }
//!     Ok(())
//! }, |path| std::fs::metadata(&path).map(|m| m.len()))?;
//! ```

mod cancel;
mod progress;

pub use cancel::CancellationToken;
pub use progress::{progress_channel, ProgressAggregator, ProgressReporter};

use crate::events::{EventSender, Phase};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Sizing of a worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Capacity of the bounded job queue
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let parallelism = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers: parallelism * 2,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Why a pool run did not produce results
#[derive(Debug)]
pub enum PoolError<E> {
    /// The run's cancellation token was raised
    Cancelled,
    /// The first error reported by a producer or worker
    Failed(E),
}

/// Returned by [`JobQueue::enqueue`] once the pool has stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halted;

/// Keeps the first error offered to it
struct ErrorSlot<E> {
    sender: Sender<E>,
    receiver: Receiver<E>,
}

impl<E> ErrorSlot<E> {
    fn new() -> Self {
        let (sender, receiver) = bounded(1);
        Self { sender, receiver }
    }

    fn offer(&self, error: E) {
        // Full means an earlier error already won.
        let _ = self.sender.try_send(error);
    }

    fn take(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }
}

/// State shared by producer and workers during one run
struct RunState<'a, E> {
    cancel: &'a CancellationToken,
    halted: AtomicBool,
    errors: ErrorSlot<E>,
    progress: &'a ProgressAggregator,
}

impl<E> RunState<'_, E> {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.halted.load(Ordering::SeqCst)
    }

    fn fail(&self, error: E) {
        self.errors.offer(error);
        self.halted.store(true, Ordering::SeqCst);
    }
}

/// Producer handle for submitting jobs
pub struct JobQueue<'a, T, E> {
    sender: Sender<T>,
    state: &'a RunState<'a, E>,
}

impl<T, E> JobQueue<'_, T, E> {
    /// Submit a job, blocking while the queue is full.
    ///
    /// Fails without submitting once the run is cancelled or a job failed.
    pub fn enqueue(&self, job: T) -> Result<(), Halted> {
        if self.state.should_stop() {
            return Err(Halted);
        }
        // Counted first so a worker can never finish a job the total lacks.
        self.state.progress.job_queued();
        if self.sender.send(job).is_err() {
            self.state.progress.job_withdrawn();
            return Err(Halted);
        }
        Ok(())
    }

    /// Whether further submissions would be refused
    pub fn is_halted(&self) -> bool {
        self.state.should_stop()
    }
}

/// A bounded worker pool bound to one run's cancellation token
pub struct WorkerPool {
    config: PoolConfig,
    cancel: CancellationToken,
}

impl WorkerPool {
    pub fn new(config: PoolConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run one phase.
    ///
    /// `produce` runs on the calling thread and feeds the queue while the
    /// workers apply `work` to each job. Results come back in no particular
    /// order. The queue is closed, workers joined and a final progress
    /// report flushed before this returns.
    pub fn run<T, R, E, P, W>(
        &self,
        phase: Phase,
        events: &EventSender,
        produce: P,
        work: W,
    ) -> Result<Vec<R>, PoolError<E>>
    where
        T: Send,
        R: Send,
        E: Send,
        P: FnOnce(&JobQueue<'_, T, E>) -> Result<(), E>,
        W: Fn(T) -> Result<R, E> + Sync,
    {
        let (progress, reporter) = progress_channel(phase, events.clone());
        let reporter_handle = thread::spawn(move || reporter.run());

        let state = RunState {
            cancel: &self.cancel,
            halted: AtomicBool::new(false),
            errors: ErrorSlot::new(),
            progress: &progress,
        };

        let workers = self.config.workers.max(1);
        let (job_tx, job_rx) = bounded::<T>(self.config.queue_capacity.max(1));

        let results = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let state = &state;
                    let work = &work;
                    scope.spawn(move || {
                        let mut out = Vec::new();
                        for job in job_rx.iter() {
                            if state.should_stop() {
                                continue;
                            }
                            match work(job) {
                                Ok(result) => out.push(result),
                                Err(e) => state.fail(e),
                            }
                            state.progress.job_done();
                        }
                        out
                    })
                })
                .collect();
            drop(job_rx);

            let queue = JobQueue {
                sender: job_tx,
                state: &state,
            };
            if let Err(e) = produce(&queue) {
                state.fail(e);
            }
            drop(queue);
            progress.seal();

            let mut results = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(out) => results.extend(out),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            results
        });

        let first_error = state.errors.take();
        drop(state);
        tracing::debug!(
            ?phase,
            processed = progress.processed(),
            total = progress.total(),
            "Worker pool drained"
        );
        progress.finish();
        let _ = reporter_handle.join();

        if self.cancel.is_cancelled() {
            return Err(PoolError::Cancelled);
        }
        match first_error {
            Some(e) => Err(PoolError::Failed(e)),
            None => Ok(results),
        }
    }
}
