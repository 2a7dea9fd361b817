//! # Supervisor: runs a worker set and turns its fate into one [`Outcome`].
//!
//! ## High-level architecture
//! ```text
//! run(workers, signals):
//!   root token ──► WorkerContext (read-only) ──► one JoinSet task per worker
//!
//!   wait_for_stop:
//!     ├─ signals.recv()   → Some(sig) → log, ShutdownRequested, cause = Signal(sig)
//!     │                   → None      → stop listening to the source
//!     ├─ set.join_next()  → Err(e)    → cause = WorkerFailed, first error = e
//!     │                   → Ok        → worker finished on its own, keep waiting
//!     └─ nothing left to wait for     → cause = WorkersExited
//!
//!   root token.cancel()                (once; happens-before the drain)
//!
//!   drain:
//!     join every remaining task        (bounded by Config::grace if non-zero)
//!     ├─ all joined     → AllStopped
//!     └─ grace exceeded → GraceExceeded, abort_all(), join the aborted tasks
//!
//!   stop forwarding, flush the subscriber queues
//!   Outcome::new(cause, first error)
//! ```
//!
//! ## Rules
//! - The supervisor is the only holder of the root token.
//! - The first error observed wins; later ones are logged at `debug`.
//! - `run` returns only once every task it spawned has been joined and every
//!   subscriber has handled the events of this run.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use listenvisor::{Config, ManualSignals, Supervisor, WorkerContext, WorkerError, WorkerFn, WorkerRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::builder(Config::default()).build();
//!     let (handle, signals) = ManualSignals::pair();
//!
//!     let ticker: WorkerRef = WorkerFn::arc("ticker", |ctx: WorkerContext| async move {
//!         while ctx.sleep(Duration::from_millis(10)).await {}
//!         Ok::<(), WorkerError>(())
//!     });
//!
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         handle.shutdown();
//!     });
//!
//!     let outcome = sup.run(vec![ticker], signals).await;
//!     assert!(outcome.is_clean());
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    core::{
        Config, SupervisorBuilder, WorkerContext,
        outcome::{Outcome, StopCause},
        runner::{WorkerExit, run_worker},
        shutdown::SignalSource,
    },
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    subscribers::{Subscribe, SubscriberSet},
    workers::WorkerRef,
};

/// Starts workers, coordinates their shutdown and reports the outcome.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Supervisor {
    /// Creates a supervisor.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
        }
    }

    /// Shorthand for [`SupervisorBuilder::new`].
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// The bus events are published on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `workers` until a shutdown notice arrives or one of them fails,
    /// then cancels all of them and waits for every one to finish.
    ///
    /// An empty worker set is valid: the call then only waits for `signals`.
    pub async fn run<I, S>(&self, workers: I, mut signals: S) -> Outcome
    where
        I: IntoIterator<Item = WorkerRef>,
        S: SignalSource,
    {
        let listener_done = CancellationToken::new();
        let listener = self.subscriber_listener(listener_done.clone());

        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        let mut running = Running::default();
        self.spawn_workers(&mut set, &mut running, &token, workers);

        let (cause, mut first_error) = self
            .wait_for_stop(&mut set, &mut running, &mut signals)
            .await;
        token.cancel();
        self.drain(&mut set, &mut running, &mut first_error).await;

        listener_done.cancel();
        let _ = listener.await;
        Outcome::new(cause, first_error)
    }

    /// Forwards bus events to a fresh subscriber set until `done`, then
    /// forwards what is still buffered and waits for the subscribers to
    /// handle it.
    fn subscriber_listener(&self, done: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subs = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = done.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => subs.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            subs.shutdown().await;
        })
    }

    fn spawn_workers<I>(
        &self,
        set: &mut JoinSet<WorkerExit>,
        running: &mut Running,
        token: &CancellationToken,
        workers: I,
    ) where
        I: IntoIterator<Item = WorkerRef>,
    {
        for worker in workers {
            let name: Arc<str> = Arc::from(worker.name());
            self.bus
                .publish(Event::new(EventKind::WorkerStarting).with_worker(name.clone()));
            running.insert(name);

            let ctx = WorkerContext::new(token.clone());
            set.spawn(run_worker(worker, ctx, self.bus.clone()));
        }
    }

    /// Waits for the first stop condition.
    async fn wait_for_stop<S: SignalSource>(
        &self,
        set: &mut JoinSet<WorkerExit>,
        running: &mut Running,
        signals: &mut S,
    ) -> (StopCause, Option<RuntimeError>) {
        let mut listening = true;
        loop {
            tokio::select! {
                notice = signals.recv(), if listening => match notice {
                    Some(signal) => {
                        info!(%signal, "received shutdown signal");
                        self.bus.publish(
                            Event::new(EventKind::ShutdownRequested).with_reason(signal.as_str()),
                        );
                        return (StopCause::Signal(signal), None);
                    }
                    None => listening = false,
                },
                Some(joined) = set.join_next(), if !set.is_empty() => {
                    if let Some((worker, err)) = running.record(joined) {
                        let cause = StopCause::WorkerFailed { worker: worker.to_string() };
                        return (cause, Some(err));
                    }
                },
                else => return (StopCause::WorkersExited, None),
            }
        }
    }

    /// Joins every remaining task, bounded by the grace period if configured.
    async fn drain(
        &self,
        set: &mut JoinSet<WorkerExit>,
        running: &mut Running,
        first_error: &mut Option<RuntimeError>,
    ) {
        let Some(grace) = self.cfg.grace_limit() else {
            join_all(set, running, first_error).await;
            self.bus.publish(Event::new(EventKind::AllStopped));
            return;
        };

        if time::timeout(grace, join_all(set, running, first_error))
            .await
            .is_ok()
        {
            self.bus.publish(Event::new(EventKind::AllStopped));
            return;
        }

        let stuck = running.names();
        self.bus.publish(
            Event::new(EventKind::GraceExceeded)
                .with_timeout(grace)
                .with_reason(stuck.join(",")),
        );
        set.abort_all();
        while set.join_next().await.is_some() {}

        first_error.get_or_insert(RuntimeError::GraceExceeded { grace, stuck });
    }
}

async fn join_all(
    set: &mut JoinSet<WorkerExit>,
    running: &mut Running,
    first_error: &mut Option<RuntimeError>,
) {
    while let Some(joined) = set.join_next().await {
        let Some((worker, err)) = running.record(joined) else {
            continue;
        };
        if first_error.is_none() {
            *first_error = Some(err);
        } else {
            debug!(worker = &*worker, error = %err, "worker failed during shutdown");
        }
    }
}

/// Identifiers of tasks not joined yet (duplicates counted).
#[derive(Default)]
struct Running {
    counts: HashMap<Arc<str>, usize>,
}

impl Running {
    fn insert(&mut self, name: Arc<str>) {
        *self.counts.entry(name).or_default() += 1;
    }

    /// Marks a joined task as finished; returns its error, if any.
    ///
    /// [`run_worker`] catches worker panics, so a join error only comes from
    /// tasks aborted after the grace period.
    fn record(&mut self, joined: Result<WorkerExit, JoinError>) -> Option<(Arc<str>, RuntimeError)> {
        match joined {
            Ok(exit) => {
                if let Some(n) = self.counts.get_mut(&exit.worker) {
                    *n -= 1;
                    if *n == 0 {
                        self.counts.remove(&exit.worker);
                    }
                }
                exit.result.err().map(|err| (exit.worker, err))
            }
            Err(_aborted) => None,
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .counts
            .iter()
            .flat_map(|(name, n)| std::iter::repeat_n(name.to_string(), *n))
            .collect();
        names.sort_unstable();
        names
    }
}
