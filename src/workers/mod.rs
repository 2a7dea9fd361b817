//! # Worker abstractions and specifications.
//!
//! - [`Worker`] trait for long-lived, cancelable units of work
//! - [`WorkerFn`] closure-backed worker
//! - [`WorkerRef`] shared handle (`Arc<dyn Worker>`)
//! - [`WorkerSpec`] / [`WorkerSet`] the `<identifier>/<target>` entries a
//!   worker set is built from

mod spec;
mod worker;
mod worker_fn;

pub use spec::{WorkerSet, WorkerSpec};
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
