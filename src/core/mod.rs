//! Runtime core: supervision and shutdown.
//!
//! - [`supervisor`]: starts workers, races failure against shutdown, drains;
//! - [`runner`]: runs one worker inside its task and reports its exit;
//! - [`shutdown`]: shutdown notices (OS signals, manual handle);
//! - [`context`]: the read-only cancellation view handed to workers;
//! - [`outcome`]: the verdict of one run.

mod builder;
mod config;
mod context;
mod outcome;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use context::WorkerContext;
pub use outcome::{Outcome, StopCause};
pub use shutdown::{ManualSignals, OsSignals, ShutdownHandle, Signal, SignalSource};
pub use supervisor::Supervisor;

pub(crate) use runner::panic_message;
