//! # Events Module
//!
//! Progress and lifecycle events emitted by the reconciliation engine.
//!
//! ## Design
//! The library never prints. Every phase reports through an
//! [`EventSender`], and whichever front end owns the matching
//! [`EventReceiver`] decides how to render it (terminal bar, JSON lines,
//! nothing at all).
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::unbounded();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Progress(p) = event {
//!             println!("{}: {}%", p.phase, p.percent);
//!         }
//!     }
//! });
//!
//! let plan = reconciler.plan(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender};
pub use types::*;
