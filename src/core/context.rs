//! # Read-only view of the supervision cancellation token.
//!
//! Every worker receives a [`WorkerContext`]. It can observe cancellation and
//! derive child tokens for its own sub-tasks, but it cannot cancel the
//! supervisor's token: only the [`Supervisor`](crate::Supervisor) decides when
//! the run stops.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellation observer handed to each worker.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    token: CancellationToken,
}

impl WorkerContext {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// True once the supervisor requested a stop.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the supervisor requests a stop.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Returns a token that is cancelled with this context.
    ///
    /// Cancelling the child does not affect the context.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Drives `fut` until it completes or the context is cancelled.
    ///
    /// Returns `None` on cancellation; `fut` is dropped in that case.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    /// Sleeps for `dur`; returns `false` if cancelled first.
    pub async fn sleep(&self, dur: Duration) -> bool {
        self.run_until_cancelled(tokio::time::sleep(dur)).await.is_some()
    }
}

impl From<CancellationToken> for WorkerContext {
    fn from(token: CancellationToken) -> Self {
        Self::new(token)
    }
}
