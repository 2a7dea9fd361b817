//! Error types used by the listenvisor runtime, its workers and process entry.
//!
//! This module defines three enums:
//!
//! - [`WorkerError`] errors returned by a single worker's `run`.
//! - [`RuntimeError`] errors carried by a failed [`Outcome`](crate::Outcome).
//! - [`ConfigError`] errors detected before supervision begins.
//!
//! All of them provide `as_label` for logs, and [`WorkerError::is_shutdown`]
//! tells a graceful stop apart from a real failure.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a worker.
///
/// Returning any of these except [`WorkerError::Canceled`] escalates to a
/// cancellation of the whole worker set.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker failed and cannot continue.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Worker was misconfigured in a way that retrying cannot fix.
    #[error("fatal: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Worker observed cancellation and stopped.
    ///
    /// Treated exactly like `Ok(())` by the supervisor.
    #[error("context cancelled")]
    Canceled,
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`WorkerError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        WorkerError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use listenvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::fail("boom").as_label(), "worker_failed");
    /// assert_eq!(WorkerError::Canceled.as_label(), "worker_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Fatal { .. } => "worker_fatal",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// True when the error only reports a cooperative stop.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, WorkerError::Canceled)
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        WorkerError::Fail {
            error: err.to_string(),
        }
    }
}

/// # Errors carried by a failed supervised run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A worker returned an error.
    #[error("worker '{worker}': {source}")]
    Worker {
        /// Identifier of the failing worker.
        worker: String,
        /// What the worker returned.
        #[source]
        source: WorkerError,
    },

    /// A worker panicked; the panic was caught at the task boundary.
    #[error("worker '{worker}' panicked: {reason}")]
    WorkerPanicked {
        /// Identifier of the panicking worker.
        worker: String,
        /// Panic payload, if it was a string.
        reason: String,
    },

    /// The drain phase exceeded the configured grace period; remaining
    /// workers were aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Identifiers of workers that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use listenvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Worker { .. } => "runtime_worker_failed",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Identifier of the worker responsible, if any.
    pub fn worker(&self) -> Option<&str> {
        match self {
            RuntimeError::Worker { worker, .. } | RuntimeError::WorkerPanicked { worker, .. } => {
                Some(worker)
            }
            RuntimeError::GraceExceeded { .. } => None,
        }
    }
}

/// # Errors detected while validating process configuration.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No listener entries were supplied.
    #[error("missing listeners")]
    MissingListeners,

    /// A listener entry is not of the form `<identifier>/<target>`.
    #[error("invalid listener '{entry}': {reason}")]
    InvalidListener {
        /// The raw entry.
        entry: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The log level is not recognized.
    #[error("invalid log level '{level}'")]
    InvalidLogLevel {
        /// The raw level.
        level: String,
    },

    /// A log subsystem name is not a valid target.
    #[error("invalid log subsystem '{subsystem}'")]
    InvalidLogSubsystem {
        /// The raw subsystem.
        subsystem: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingListeners => "config_missing_listeners",
            ConfigError::InvalidListener { .. } => "config_invalid_listener",
            ConfigError::InvalidLogLevel { .. } => "config_invalid_log_level",
            ConfigError::InvalidLogSubsystem { .. } => "config_invalid_log_subsystem",
        }
    }
}
