//! Event transport built on crossbeam-channel.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to the engine.
///
/// Cheap to clone; every phase and worker thread holds its own copy.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver is not an error: the event is discarded and the
    /// run carries on unobserved.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// A sender whose receiver is already gone
    pub fn detached() -> Self {
        let (sender, _receiver) = EventChannel::unbounded();
        sender
    }
}

/// Receiving half held by the front end
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block for the next event; `None` once every sender is dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Blocking iterator that ends when every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything currently buffered, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Constructors for connected sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    pub fn unbounded() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }

    /// Channel that applies backpressure once `capacity` events are queued
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }
}
