//! # Supervisor runtime configuration.
//!
//! ## Sentinel values
//! - `grace = 0s` → wait for workers indefinitely once cancelled

use std::time::Duration;

/// Settings of a [`Supervisor`](crate::Supervisor).
#[derive(Clone, Debug)]
pub struct Config {
    /// Upper bound on the drain phase after cancellation.
    ///
    /// `Duration::ZERO` waits for every worker, however long it takes. A
    /// non-zero value aborts the remaining workers once exceeded and reports
    /// [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded).
    pub grace: Duration,

    /// Capacity of the event bus ring buffer (min 1).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the drain bound as an `Option` (`None` = unbounded).
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// `grace = 0s` (unbounded), `bus_capacity = 1024`.
    fn default() -> Self {
        Self {
            grace: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
