//! # Jitter applied to reconnect delays.
//!
//! Many listeners usually point at the same upstream. When it restarts they
//! all notice at once, so their retries should not line up.
//!
//! - [`JitterPolicy::None`]  exact delay
//! - [`JitterPolicy::Full`]  random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Randomization strategy for retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the computed delay as is.
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// Half of the delay plus a random share of the other half.
    #[default]
    Equal,
}

impl JitterPolicy {
    /// Applies the jitter to `delay`, at microsecond resolution.
    pub fn apply(&self, delay: Duration) -> Duration {
        let us = delay.as_micros().min(u128::from(u64::MAX)) as u64;

        let mut rng = rand::rng();
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_micros(rng.random_range(0..=us)),
            JitterPolicy::Equal => {
                let half = us / 2;
                Duration::from_micros(half + rng.random_range(0..=half))
            }
        }
    }
}
