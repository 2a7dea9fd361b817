//! # Runtime events emitted by the supervisor and worker tasks.
//!
//! Each [`Event`] carries a process-wide sequence number (`seq`) that grows
//! monotonically, so subscribers can restore the publish order.
//!
//! ## Example
//! ```rust
//! use listenvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WorkerFailed)
//!     .with_worker("my-endpoint")
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::WorkerFailed);
//! assert_eq!(ev.worker.as_deref(), Some("my-endpoint"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A worker task was spawned.
    ///
    /// Sets: `worker`.
    WorkerStarting,

    /// A worker returned `Ok(())` or `Canceled`.
    ///
    /// Sets: `worker`.
    WorkerStopped,

    /// A worker returned an error or panicked.
    ///
    /// Sets: `worker`, `reason`.
    WorkerFailed,

    /// A shutdown notice arrived from the signal source.
    ///
    /// Sets: `reason` (signal name).
    ShutdownRequested,

    /// Every worker task finished after cancellation.
    AllStopped,

    /// The drain phase exceeded the grace period.
    ///
    /// Sets: `timeout_ms`, `reason` (stuck workers).
    GraceExceeded,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `worker` (subscriber name), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `worker` (subscriber name), `reason`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Worker identifier, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable detail (error, signal name, ...).
    pub reason: Option<Arc<str>>,
    /// Grace period in milliseconds.
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates an event of the given kind stamped with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a worker identifier.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Creates a subscriber overflow event.
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }
}
