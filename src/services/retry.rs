//! Retry policy for background refreshes.

use crate::Error;
use std::time::Duration;

/// Default pause between a failed refresh and its retry.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// How a refresh cycle reacts to a failed attempt.
///
/// Backoff is fixed. By default every failure is retried until the attempt
/// budget runs out; [`RetryPolicy::transient_only`] gives up at the first
/// failure that is not [`Error::Transient`]. The next scheduled tick starts
/// a fresh budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per cycle; `None` retries until success or shutdown.
    pub max_attempts: Option<u32>,
    /// Pause between attempts.
    pub backoff: Duration,
    /// Stop retrying on failures a retry cannot fix.
    pub transient_only: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unlimited(DEFAULT_RETRY_BACKOFF)
    }
}

impl RetryPolicy {
    /// Retries forever with a fixed backoff.
    #[must_use]
    pub const fn unlimited(backoff: Duration) -> Self {
        Self {
            max_attempts: None,
            backoff,
            transient_only: false,
        }
    }

    /// Makes one attempt per cycle and leaves recovery to the next tick.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_attempts: Some(1),
            backoff: Duration::ZERO,
            transient_only: false,
        }
    }

    /// Caps the attempts per cycle (at least one).
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(if max_attempts == 0 { 1 } else { max_attempts });
        self
    }

    /// Sets the backoff.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Retries only [`Error::Transient`] failures.
    #[must_use]
    pub const fn transient_only(mut self) -> Self {
        self.transient_only = true;
        self
    }

    /// Returns the pause before retrying after `error` ended `attempt`
    /// (1-based), or `None` if the cycle should give up.
    #[must_use]
    pub const fn delay_for(&self, error: &Error, attempt: u32) -> Option<Duration> {
        if self.transient_only && !error.is_transient() {
            return None;
        }
        self.delay_after(attempt)
    }

    /// Returns the pause before the attempt following `attempt` (1-based),
    /// or `None` if the budget is spent.
    #[must_use]
    pub const fn delay_after(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt >= max => None,
            _ => Some(self.backoff),
        }
    }
}
