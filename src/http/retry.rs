//! Retry policy and attempt classification
//!
//! A failed attempt is either retryable or fatal; the policy decides how
//! long to wait and when the budget is spent.

use crate::error::Error;
use std::time::Duration;

/// Outcome of a single request attempt
#[derive(Debug)]
pub enum Attempt<T> {
    /// The request succeeded
    Success(T),
    /// A transient failure (429, 5xx, transport error)
    Retryable(Error),
    /// A failure that retrying cannot fix
    Fatal(Error),
}

impl<T> Attempt<T> {
    /// Classify an error as retryable or fatal
    pub fn from_error(error: Error) -> Self {
        if error.is_retryable() {
            Attempt::Retryable(error)
        } else {
            Attempt::Fatal(error)
        }
    }

    /// Check if this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Success(_))
    }

    /// Check if this attempt may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Attempt::Retryable(_))
    }
}

/// Constant backoff with random jitter and a bounded attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub interval: Duration,
    /// Upper bound (exclusive) of the random delay added to `interval`
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(30),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, interval: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            max_jitter,
        }
    }

    /// A policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the next attempt: `interval` plus uniform jitter
    pub fn delay(&self) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            fastrand::u64(0..jitter_ms)
        };
        self.interval + Duration::from_millis(jitter)
    }
}
