//! # Runs one worker to completion inside its supervised task.
//!
//! ```text
//! worker.run(ctx)
//!   ├─ Ok(()) / Err(Canceled) ─► publish WorkerStopped ─► Ok
//!   ├─ Err(e)                 ─► publish WorkerFailed  ─► RuntimeError::Worker
//!   └─ panic                  ─► publish WorkerFailed  ─► RuntimeError::WorkerPanicked
//! ```
//!
//! Panics are caught at this boundary so every task reports back to the
//! supervisor with the worker's identifier attached.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::{
    core::WorkerContext,
    error::{RuntimeError, WorkerError},
    events::{Bus, Event, EventKind},
    workers::WorkerRef,
};

/// What a finished worker task hands back to the supervisor.
pub(crate) struct WorkerExit {
    pub worker: Arc<str>,
    pub result: Result<(), RuntimeError>,
}

/// Runs `worker` once and publishes exactly one terminal event.
pub(crate) async fn run_worker(worker: WorkerRef, ctx: WorkerContext, bus: Bus) -> WorkerExit {
    let name: Arc<str> = Arc::from(worker.name());

    let result = match AssertUnwindSafe(worker.run(ctx)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.is_shutdown() => Ok(()),
        Ok(Err(err)) => Err(RuntimeError::Worker {
            worker: name.to_string(),
            source: err,
        }),
        Err(payload) => Err(RuntimeError::WorkerPanicked {
            worker: name.to_string(),
            reason: panic_message(payload.as_ref()),
        }),
    };

    match &result {
        Ok(()) => bus.publish(Event::new(EventKind::WorkerStopped).with_worker(name.clone())),
        Err(err) => bus.publish(
            Event::new(EventKind::WorkerFailed)
                .with_worker(name.clone())
                .with_reason(failure_reason(err)),
        ),
    }

    WorkerExit {
        worker: name,
        result,
    }
}

fn failure_reason(err: &RuntimeError) -> String {
    match err {
        RuntimeError::Worker { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
