//! # Listener: one registered endpoint forwarding to an upstream address.
//!
//! The endpoint registration protocol lives elsewhere. This worker owns the
//! part of a listener's life the supervisor relies on: it keeps checking that
//! its forward address is reachable, reconnects with its own backoff while
//! the upstream is down, and stops as soon as its context is cancelled.
//!
//! ```text
//! loop {
//!   probe(forward_addr)            (cancellable)
//!     ├─ Ok           → reset failures, wait probe_interval
//!     ├─ InvalidInput → Err(Fatal)  (address is not host:port)
//!     └─ other Err    → wait backoff.next(failures), failures += 1
//!   wait                          (cancellable)
//! }
//! ```

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpStream, lookup_host};
use tokio::time;
use tracing::{debug, info, warn};

use crate::core::WorkerContext;
use crate::error::WorkerError;
use crate::policies::BackoffPolicy;
use crate::workers::{Worker, WorkerSpec};

/// Worker for one `<endpoint ID>/<forward addr>` entry.
#[derive(Clone, Debug)]
pub struct Listener {
    endpoint_id: String,
    forward_addr: String,
    backoff: BackoffPolicy,
    probe_interval: Duration,
    connect_timeout: Duration,
}

impl Listener {
    /// Creates a listener for `spec` with default timings.
    pub fn new(spec: &WorkerSpec) -> Self {
        Self {
            endpoint_id: spec.identifier().to_owned(),
            forward_addr: spec.target().to_owned(),
            backoff: BackoffPolicy::default(),
            probe_interval: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the reconnect backoff.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets how often a reachable upstream is checked again.
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Sets the per-connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Resolves the forward address and connects to the first address that accepts.
    async fn probe(&self) -> io::Result<SocketAddr> {
        let mut last_err = None;
        for addr in lookup_host(self.forward_addr.as_str()).await? {
            match time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => return Ok(addr),
                Ok(Err(err)) => last_err = Some(err),
                Err(_elapsed) => {
                    last_err = Some(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        }))
    }
}

#[async_trait]
impl Worker for Listener {
    fn name(&self) -> &str {
        &self.endpoint_id
    }

    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
        let (endpoint_id, forward_addr) = (self.endpoint_id.as_str(), self.forward_addr.as_str());
        info!(endpoint_id, forward_addr, "listener starting");

        let mut failures: u32 = 0;
        loop {
            let Some(probed) = ctx.run_until_cancelled(self.probe()).await else {
                break;
            };

            let wait = match probed {
                Ok(addr) => {
                    if failures > 0 {
                        info!(endpoint_id, %addr, failures, "upstream reachable again");
                    } else {
                        debug!(endpoint_id, %addr, "upstream reachable");
                    }
                    failures = 0;
                    self.probe_interval
                }
                Err(err) if err.kind() == io::ErrorKind::InvalidInput => {
                    return Err(WorkerError::fatal(format!(
                        "invalid forward address '{forward_addr}': {err}"
                    )));
                }
                Err(err) => {
                    let delay = self.backoff.next(failures);
                    failures = failures.saturating_add(1);
                    warn!(endpoint_id, forward_addr, error = %err, ?delay, "upstream unreachable");
                    delay
                }
            };

            if !ctx.sleep(wait).await {
                break;
            }
        }

        debug!(endpoint_id, "listener stopped");
        Ok(())
    }
}
