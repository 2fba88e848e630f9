//! # Retry Backoff
//!
//! Per-target Fibonacci delays for failed replications.
//!
//! Delays grow as 1m, 1m, 2m, 3m, 5m, 8m and then stay at the cap (10m with the
//! default configuration). Arithmetic saturates, so oversized configuration
//! values clamp to the largest representable delay.
//!
//! ```rust
//! use secret_replicator::runtime::FibonacciBackoff;
//! use std::time::Duration;
//!
//! let delays: Vec<Duration> = FibonacciBackoff::new(1, 10).take(3).collect();
//! assert_eq!(delays, [60, 60, 120].map(Duration::from_secs));
//! ```

use crate::config::ReplicatorConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

const SECONDS_PER_MINUTE: u64 = 60;

/// Endless sequence of Fibonacci delays capped at a maximum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibonacciBackoff {
    cap_minutes: u64,
    /// (previous, current) term in minutes
    terms: (u64, u64),
    attempts: u32,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            cap_minutes: max_minutes.max(min_minutes),
            terms: (0, min_minutes),
            attempts: 0,
        }
    }

    /// Delays handed out so far
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Iterator for FibonacciBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let (previous, current) = self.terms;
        self.terms = (
            current,
            previous.saturating_add(current).min(self.cap_minutes),
        );
        self.attempts = self.attempts.saturating_add(1);
        Some(minutes(current))
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(SECONDS_PER_MINUTE))
}

/// Backoff state per target, keyed by `namespace/name`
///
/// Entries live only while a target keeps failing; a successful replication
/// drops its entry through [`BackoffRegistry::reset`].
#[derive(Debug)]
pub struct BackoffRegistry {
    min_minutes: u64,
    max_minutes: u64,
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl Default for BackoffRegistry {
    fn default() -> Self {
        Self::from_config(&ReplicatorConfig::default())
    }
}

impl BackoffRegistry {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            states: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_config(config: &ReplicatorConfig) -> Self {
        Self::new(config.backoff_min_minutes, config.backoff_max_minutes)
    }

    /// Record a failure for `key` and return the delay before the next attempt
    /// together with the consecutive error count
    pub fn next_delay(&self, key: &str) -> (Duration, u32) {
        let Ok(mut states) = self.states.lock() else {
            warn!("backoff state lock poisoned, using minimum delay for {}", key);
            return (self.min_delay(), 0);
        };
        let backoff = states
            .entry(key.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.min_minutes, self.max_minutes));
        let delay = backoff.next().unwrap_or_else(|| self.min_delay());
        (delay, backoff.attempts())
    }

    #[must_use]
    pub fn min_delay(&self) -> Duration {
        minutes(self.min_minutes)
    }

    /// Forget the failure history of `key` after a successful replication
    pub fn reset(&self, key: &str) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(key);
        }
    }

    #[must_use]
    pub fn error_count(&self, key: &str) -> u32 {
        self.states
            .lock()
            .ok()
            .and_then(|states| states.get(key).map(FibonacciBackoff::attempts))
            .unwrap_or(0)
    }

    /// Number of targets currently backing off
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.states.lock().map(|states| states.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_sequence_is_capped() {
        let seconds: Vec<u64> = FibonacciBackoff::new(1, 10)
            .take(8)
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(seconds, vec![60, 60, 120, 180, 300, 480, 600, 600]);
    }

    #[test]
    fn test_cap_below_minimum_uses_minimum() {
        let seconds: Vec<u64> = FibonacciBackoff::new(5, 2)
            .take(3)
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(seconds, vec![300, 300, 300]);
    }

    #[test]
    fn test_huge_configured_minimum_saturates() {
        let config = ReplicatorConfig::from_lookup(|key| {
            (key == "BACKOFF_MIN_MINUTES").then(|| u64::MAX.to_string())
        });
        let registry = BackoffRegistry::from_config(&config);

        let (first, _) = registry.next_delay("team-a/db");
        let (second, count) = registry.next_delay("team-a/db");

        assert_eq!(first, Duration::from_secs(u64::MAX));
        assert_eq!(second, Duration::from_secs(u64::MAX));
        assert_eq!(count, 2);
        assert_eq!(registry.min_delay(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_registry_tracks_targets_independently() {
        let registry = BackoffRegistry::new(1, 10);
        registry.next_delay("team-a/db");
        registry.next_delay("team-a/db");
        let (delay, count) = registry.next_delay("team-a/db");
        assert_eq!(delay, Duration::from_secs(120));
        assert_eq!(count, 3);

        let (other, other_count) = registry.next_delay("team-b/db");
        assert_eq!(other, Duration::from_secs(60));
        assert_eq!(other_count, 1);
        assert_eq!(registry.tracked(), 2);
    }

    #[test]
    fn test_registry_reset() {
        let registry = BackoffRegistry::new(1, 10);
        registry.next_delay("team-a/db");
        registry.next_delay("team-a/db");
        registry.reset("team-a/db");
        assert_eq!(registry.error_count("team-a/db"), 0);
        assert_eq!(registry.tracked(), 0);
        assert_eq!(registry.next_delay("team-a/db").0, Duration::from_secs(60));
    }
}
