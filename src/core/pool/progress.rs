//! Per-phase progress aggregation.
//!
//! Workers and producers bump counters on a [`ProgressAggregator`] and
//! push snapshots into a small bounded channel without ever blocking; a
//! separate [`ProgressReporter`] drains it and forwards an event only when
//! progress crosses the next 20% step. Snapshots that do not fit in the
//! channel are dropped: a later one always supersedes them.
//!
//! Steps are measured against the final job count, so nothing but the
//! last report is emitted until the producer has [sealed](ProgressAggregator::seal)
//! the total.

use crate::events::{Event, EventSender, Phase, PhaseProgress};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const PROGRESS_STEP: usize = 20;
const PROGRESS_BUFFER: usize = 100;

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    processed: usize,
    total: usize,
    sealed: bool,
    last: bool,
}

/// Counter side, owned by one phase of the run
pub struct ProgressAggregator {
    processed: AtomicUsize,
    total: AtomicUsize,
    sealed: AtomicBool,
    sender: Sender<Snapshot>,
}

/// Consumer side, turns snapshots into throttled events
pub struct ProgressReporter {
    phase: Phase,
    receiver: Receiver<Snapshot>,
    events: EventSender,
}

/// Create a connected aggregator/reporter pair for `phase`
pub fn progress_channel(phase: Phase, events: EventSender) -> (ProgressAggregator, ProgressReporter) {
    let (sender, receiver) = bounded(PROGRESS_BUFFER);
    (
        ProgressAggregator {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            sealed: AtomicBool::new(false),
            sender,
        },
        ProgressReporter {
            phase,
            receiver,
            events,
        },
    )
}

impl ProgressAggregator {
    pub fn job_queued(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.publish(false);
    }

    /// Undo a [`job_queued`](Self::job_queued) whose job never reached the queue
    pub fn job_withdrawn(&self) {
        self.total.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn job_done(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.publish(false);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Mark the total as final; no job is queued after this.
    ///
    /// Blocks until the reporter has room so the sealed state is never lost.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
        let _ = self.sender.send(self.snapshot(false));
    }

    // Sealed is read first and processed before total, so a sealed
    // snapshot carries the final total and processed never exceeds it.
    fn snapshot(&self, last: bool) -> Snapshot {
        let sealed = self.sealed.load(Ordering::SeqCst);
        let processed = self.processed();
        Snapshot {
            processed,
            total: self.total(),
            sealed,
            last,
        }
    }

    fn publish(&self, last: bool) {
        let _ = self.sender.try_send(self.snapshot(last));
    }

    /// Send the final snapshot and close the channel.
    ///
    /// Blocks until the reporter has room, so the last report is never lost.
    pub fn finish(self) {
        let _ = self.sender.send(self.snapshot(true));
    }
}

impl ProgressReporter {
    /// Drain snapshots until the aggregator is finished
    pub fn run(self) {
        let mut last_step = 0usize;
        let mut last_emitted: Option<(usize, usize)> = None;

        for snapshot in self.receiver.iter() {
            if snapshot.total == 0 || !(snapshot.sealed || snapshot.last) {
                continue;
            }

            let percent = snapshot.processed * 100 / snapshot.total;
            let crossed = percent >= last_step + PROGRESS_STEP;
            let pair = (snapshot.processed, snapshot.total);

            if !(crossed || snapshot.last) || last_emitted == Some(pair) {
                continue;
            }

            self.events.send(Event::Progress(PhaseProgress {
                phase: self.phase,
                processed: snapshot.processed,
                total: snapshot.total,
                percent: percent.min(100) as u8,
            }));
            last_emitted = Some(pair);
            last_step = percent - percent % PROGRESS_STEP;
        }
    }
}
