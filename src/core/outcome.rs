//! # Result of one supervised run.

use std::process::ExitCode;

use crate::core::shutdown::Signal;
use crate::error::RuntimeError;

/// What made the supervisor stop the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopCause {
    /// A shutdown notice arrived.
    Signal(Signal),
    /// A worker returned an error or panicked.
    WorkerFailed {
        /// Identifier of the worker.
        worker: String,
    },
    /// Every worker exited on its own and the signal source can never
    /// deliver a notice.
    WorkersExited,
}

/// Final verdict of [`Supervisor::run`](crate::Supervisor::run).
///
/// Only produced after every worker task has finished.
#[derive(Debug)]
pub enum Outcome {
    /// No worker returned an error.
    Clean {
        /// What stopped the run.
        cause: StopCause,
    },
    /// At least one worker failed; `error` is the first one observed.
    Failed {
        /// What stopped the run.
        cause: StopCause,
        /// First observed error.
        error: RuntimeError,
    },
}

impl Outcome {
    pub(crate) fn new(cause: StopCause, error: Option<RuntimeError>) -> Self {
        match error {
            Some(error) => Outcome::Failed { cause, error },
            None => Outcome::Clean { cause },
        }
    }

    /// True when no worker failed.
    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::Clean { .. })
    }

    /// What stopped the run.
    pub fn cause(&self) -> &StopCause {
        match self {
            Outcome::Clean { cause } | Outcome::Failed { cause, .. } => cause,
        }
    }

    /// The carried error, if the run failed.
    pub fn error(&self) -> Option<&RuntimeError> {
        match self {
            Outcome::Clean { .. } => None,
            Outcome::Failed { error, .. } => Some(error),
        }
    }

    /// Converts into a `Result`, dropping the cause on failure.
    pub fn into_result(self) -> Result<StopCause, RuntimeError> {
        match self {
            Outcome::Clean { cause } => Ok(cause),
            Outcome::Failed { error, .. } => Err(error),
        }
    }

    /// Process exit status: `0` when clean, `1` when failed.
    pub fn exit_status(&self) -> u8 {
        if self.is_clean() { 0 } else { 1 }
    }

    /// [`exit_status`](Self::exit_status) as an [`ExitCode`].
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;

    #[test]
    fn failed_maps_to_non_zero() {
        let out = Outcome::new(
            StopCause::WorkerFailed { worker: "b".into() },
            Some(RuntimeError::Worker {
                worker: "b".into(),
                source: WorkerError::fail("connection refused"),
            }),
        );
        assert!(!out.is_clean());
        assert_eq!(out.exit_status(), 1);
        assert_eq!(out.error().and_then(RuntimeError::worker), Some("b"));
    }

    #[test]
    fn clean_maps_to_zero() {
        let out = Outcome::new(StopCause::Signal(Signal::Interrupt), None);
        assert_eq!(out.exit_status(), 0);
        assert_eq!(out.into_result().unwrap(), StopCause::Signal(Signal::Interrupt));
    }
}
