//! # listenvisor
//!
//! **listenvisor** runs a set of long-lived network listeners inside one
//! process, stops all of them together, and reduces their individual fates to
//! a single [`Outcome`].
//!
//! ## Architecture
//! ```text
//!   "<id>/<addr>" entries ──► WorkerSet ──► factory ──► Vec<WorkerRef>
//!                                                            │
//!   SignalSource (OsSignals / ManualSignals) ───┐            ▼
//! ┌─────────────────────────────────────────────┴──────────────────────┐
//! │  Supervisor::run(workers, signals)                                 │
//! │  - one JoinSet task per worker, all sharing one cancellation token │
//! │  - waits for: first shutdown notice OR first worker error          │
//! │  - cancels the token once, joins every task, builds the Outcome    │
//! └──────┬──────────────────────┬──────────────────────────┬───────────┘
//!        ▼                      ▼                          ▼
//!   worker.run(ctx)        worker.run(ctx)            worker.run(ctx)
//!        │ WorkerStarting / WorkerStopped / WorkerFailed   │
//!        └──────────────► Bus (broadcast) ◄────────────────┘
//!                              │
//!                              ▼
//!                   SubscriberSet ─► LogWriter, custom subscribers
//! ```
//!
//! ## Outcome
//! | Stop condition        | Worker errors | Outcome                       | Exit status |
//! |-----------------------|---------------|-------------------------------|-------------|
//! | shutdown notice       | none          | `Clean { Signal(sig) }`       | 0           |
//! | shutdown notice       | during drain  | `Failed { Signal(sig), err }` | 1           |
//! | worker error / panic  | first one     | `Failed { WorkerFailed, err }`| 1           |
//! | grace period exceeded | none          | `Failed { .., GraceExceeded }`| 1           |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use listenvisor::{Config, ManualSignals, Supervisor, WorkerContext, WorkerError, WorkerFn, WorkerRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::builder(Config::default()).build();
//!     let (_handle, signals) = ManualSignals::pair();
//!
//!     let healthy: WorkerRef = WorkerFn::arc("a", |ctx: WorkerContext| async move {
//!         ctx.cancelled().await;
//!         Ok::<(), WorkerError>(())
//!     });
//!     let broken: WorkerRef = WorkerFn::arc("b", |_ctx: WorkerContext| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Err::<(), _>(WorkerError::fail("connection refused"))
//!     });
//!
//!     let outcome = sup.run(vec![healthy, broken], signals).await;
//!     assert_eq!(outcome.exit_status(), 1);
//!     assert_eq!(outcome.error().unwrap().to_string(), "worker 'b': connection refused");
//! }
//! ```

pub mod config;
mod core;
mod error;
mod events;
mod listener;
pub mod logging;
mod policies;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use config::{AgentConfig, LogConfig};
pub use core::{
    Config, ManualSignals, OsSignals, Outcome, ShutdownHandle, Signal, SignalSource, StopCause,
    Supervisor, SupervisorBuilder, WorkerContext,
};
pub use error::{ConfigError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use listener::Listener;
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{Worker, WorkerFn, WorkerRef, WorkerSet, WorkerSpec};
