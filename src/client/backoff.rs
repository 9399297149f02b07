//! Exponential backoff for the status poll loop.
//!
//! Mirrors the wait policy of the service's own client libraries: start
//! small, double on every poll, saturate at a cap. This is progress
//! waiting while the job is still queued or running, not error retry.

use std::time::Duration;

/// Initial wait between status polls.
const INITIAL_WAIT_MS: u64 = 500;

/// Upper bound on the wait between status polls.
const MAX_WAIT_MS: u64 = 30_000;

/// An exponentially increasing wait interval.
#[derive(Debug, Clone)]
pub struct ExponentialBackOff {
    next_wait_ms: u64,
    max_wait_ms: u64,
    attempts: u32,
}

impl ExponentialBackOff {
    /// Creates a backoff with the default initial and maximum waits.
    pub fn new() -> Self {
        Self::with_bounds(INITIAL_WAIT_MS, MAX_WAIT_MS)
    }

    /// Creates a backoff with explicit bounds, in milliseconds.
    pub fn with_bounds(initial_ms: u64, max_ms: u64) -> Self {
        Self {
            next_wait_ms: initial_ms.min(max_ms),
            max_wait_ms: max_ms,
            attempts: 0,
        }
    }

    /// Returns the next wait interval and advances the schedule.
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.next_wait_ms;
        self.next_wait_ms = (self.next_wait_ms.saturating_mul(2)).min(self.max_wait_ms);
        self.attempts += 1;
        Duration::from_millis(wait)
    }

    /// Number of waits handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ExponentialBackOff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_from_initial() {
        let mut backoff = ExponentialBackOff::with_bounds(500, 30_000);
        assert_eq!(backoff.next_wait(), Duration::from_millis(500));
        assert_eq!(backoff.next_wait(), Duration::from_millis(1_000));
        assert_eq!(backoff.next_wait(), Duration::from_millis(2_000));
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn test_saturates_at_cap() {
        let mut backoff = ExponentialBackOff::with_bounds(500, 1_500);
        assert_eq!(backoff.next_wait(), Duration::from_millis(500));
        assert_eq!(backoff.next_wait(), Duration::from_millis(1_000));
        assert_eq!(backoff.next_wait(), Duration::from_millis(1_500));
        assert_eq!(backoff.next_wait(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_initial_clamped_to_cap() {
        let mut backoff = ExponentialBackOff::with_bounds(5_000, 1_000);
        assert_eq!(backoff.next_wait(), Duration::from_millis(1_000));
    }

    #[test]
    fn test_zero_attempts_initially() {
        let backoff = ExponentialBackOff::new();
        assert_eq!(backoff.attempts(), 0);
    }
}
