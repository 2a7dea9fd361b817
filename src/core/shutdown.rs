//! # Shutdown notices.
//!
//! The supervisor does not read process signals from ambient state. It
//! receives a [`SignalSource`] and awaits its first notice at most once, so any
//! later notice is ignored.
//!
//! - [`OsSignals`] registers its handlers in [`OsSignals::subscribe`], i.e.
//!   before any worker starts, so an early signal is never lost.
//! - [`ManualSignals`] is driven by a [`ShutdownHandle`]; useful in tests and
//!   when embedding the supervisor in a larger program.
//!
//! ## Signals
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//! **Windows:** `Ctrl-C`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

/// A termination request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in a terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `Ctrl-C` on Windows.
    CtrlC,
    /// Requested programmatically through a [`ShutdownHandle`].
    Manual,
}

impl Signal {
    /// Conventional name, as logged.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::CtrlC => "CTRL_C",
            Signal::Manual => "manual",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of shutdown notices.
#[async_trait]
pub trait SignalSource: Send {
    /// Waits for the next notice.
    ///
    /// `None` means the source can never deliver one; the supervisor then
    /// stops listening to it.
    async fn recv(&mut self) -> Option<Signal>;
}

/// Process signals, registered eagerly.
#[cfg(unix)]
pub struct OsSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Installs the handlers. Must be called inside a Tokio runtime.
    pub fn subscribe() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.sigint.recv() => Some(Signal::Interrupt),
            Some(()) = self.sigterm.recv() => Some(Signal::Terminate),
            Some(()) = self.sigquit.recv() => Some(Signal::Quit),
            else => None,
        }
    }
}

/// Process signals, registered eagerly.
#[cfg(windows)]
pub struct OsSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl OsSignals {
    /// Installs the handler. Must be called inside a Tokio runtime.
    pub fn subscribe() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }
}

#[cfg(windows)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.ctrl_c.recv().await.map(|()| Signal::CtrlC)
    }
}

/// Signal source fed by a [`ShutdownHandle`].
pub struct ManualSignals {
    rx: watch::Receiver<Option<Signal>>,
}

/// Requests shutdown of a [`ManualSignals`] source. Cheap to clone.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<Option<Signal>>>,
}

impl ManualSignals {
    /// Creates a connected handle/source pair.
    pub fn pair() -> (ShutdownHandle, ManualSignals) {
        let (tx, rx) = watch::channel(None);
        (ShutdownHandle { tx: Arc::new(tx) }, ManualSignals { rx })
    }
}

impl ShutdownHandle {
    /// Delivers [`Signal::Manual`].
    pub fn shutdown(&self) -> bool {
        self.deliver(Signal::Manual)
    }

    /// Delivers `signal`; only the first delivery is kept.
    ///
    /// Returns `false` if a notice was already delivered.
    pub fn deliver(&self, signal: Signal) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(signal);
            true
        })
    }
}

#[async_trait]
impl SignalSource for ManualSignals {
    async fn recv(&mut self) -> Option<Signal> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(slot) => *slot,
            Err(_closed) => None,
        }
    }
}
