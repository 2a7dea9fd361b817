//! Reconnect policies for workers.
//!
//! The supervisor never retries a worker. A worker that talks to a flaky peer
//! owns its own retry loop, and these types describe how long it waits
//! between attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied on top of the computed delay
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=250ms, factor=2.0, max=30s, jitter=Equal.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
