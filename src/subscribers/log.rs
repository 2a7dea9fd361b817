//! # LogWriter: renders runtime events through `tracing`.
//!
//! Worker lifecycle goes to `debug`, failures to `warn`, shutdown progress to
//! `info`. Top-level lines ("received shutdown signal", "shutdown complete")
//! are logged by the caller from the [`Outcome`](crate::Outcome), not here.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::WorkerStarting => debug!(worker, "worker starting"),
            EventKind::WorkerStopped => debug!(worker, "worker stopped"),
            EventKind::WorkerFailed => warn!(worker, error = reason, "worker failed"),
            EventKind::ShutdownRequested => info!(signal = reason, "shutdown requested"),
            EventKind::AllStopped => debug!("all workers stopped"),
            EventKind::GraceExceeded => {
                warn!(grace_ms = e.timeout_ms, stuck = reason, "grace period exceeded")
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = worker, reason, "subscriber dropped event")
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber = worker, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
