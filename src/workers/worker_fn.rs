//! # Closure-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps `F: Fn(WorkerContext) -> Fut`. Every call to `run`
//! creates a fresh future, so shared state has to be captured explicitly
//! through an `Arc`.
//!
//! ## Example
//! ```rust
//! use listenvisor::{WorkerContext, WorkerError, WorkerFn, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc("ticker", |ctx: WorkerContext| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, WorkerError>(())
//! });
//! assert_eq!(w.name(), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WorkerContext;
use crate::error::WorkerError;
use crate::workers::worker::Worker;

/// Function-backed worker implementation.
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
        (self.f)(ctx).await
    }
}
