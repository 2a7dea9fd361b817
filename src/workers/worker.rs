//! # The worker contract.
//!
//! A worker runs until told to stop or until it fails:
//! - it must return promptly once its [`WorkerContext`] is cancelled;
//! - it may return an error at any time to report an unrecoverable failure;
//! - `Ok(())` means "stopped cleanly", whether by choice or by cancellation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WorkerContext;
use crate::error::WorkerError;

/// # Long-lived, cancelable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use listenvisor::{Worker, WorkerContext, WorkerError};
///
/// struct Idle;
///
/// #[async_trait]
/// impl Worker for Idle {
///     fn name(&self) -> &str { "idle" }
///
///     async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Runs until `ctx` is cancelled or an unrecoverable error occurs.
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError>;
}

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;
