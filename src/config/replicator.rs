//! # Replicator Configuration
//!
//! Replicator-level settings loaded from environment variables.

use crate::constants::{DEFAULT_BACKOFF_MAX_MINUTES, DEFAULT_BACKOFF_MIN_MINUTES};

/// Replicator-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatorConfig {
    /// Permit replication regardless of source opt-in annotations
    pub allow_all: bool,
    /// Fibonacci backoff starting value (minutes)
    pub backoff_min_minutes: u64,
    /// Fibonacci backoff cap (minutes)
    pub backoff_max_minutes: u64,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    /// Only used when `RUST_LOG` is not set
    pub log_level: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            allow_all: false,
            backoff_min_minutes: DEFAULT_BACKOFF_MIN_MINUTES,
            backoff_max_minutes: DEFAULT_BACKOFF_MAX_MINUTES,
            log_level: "INFO".to_string(),
            log_enable_color: false,
        }
    }
}

impl ReplicatorConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let backoff_min_minutes = parse_or(
            lookup("BACKOFF_MIN_MINUTES"),
            defaults.backoff_min_minutes,
        )
        .max(1);
        let backoff_max_minutes = parse_or(
            lookup("BACKOFF_MAX_MINUTES"),
            defaults.backoff_max_minutes,
        )
        .max(backoff_min_minutes);

        Self {
            allow_all: parse_bool_or(lookup("ALLOW_ALL"), defaults.allow_all),
            backoff_min_minutes,
            backoff_max_minutes,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_enable_color: parse_bool_or(lookup("LOG_ENABLE_COLOR"), defaults.log_enable_color),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool_or(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| {
            let v_lower = v.trim().to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ReplicatorConfig::from_lookup(|_| None);
        assert_eq!(config, ReplicatorConfig::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ReplicatorConfig::from_lookup(lookup_from(&[
            ("ALLOW_ALL", "yes"),
            ("BACKOFF_MIN_MINUTES", "2"),
            ("BACKOFF_MAX_MINUTES", "30"),
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_ENABLE_COLOR", "on"),
        ]));
        assert!(config.allow_all);
        assert_eq!(config.backoff_min_minutes, 2);
        assert_eq!(config.backoff_max_minutes, 30);
        assert_eq!(config.log_level, "DEBUG");
        assert!(config.log_enable_color);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = ReplicatorConfig::from_lookup(lookup_from(&[("BACKOFF_MIN_MINUTES", "soon")]));
        assert_eq!(config.backoff_min_minutes, DEFAULT_BACKOFF_MIN_MINUTES);
    }

    #[test]
    fn test_backoff_max_never_below_min() {
        let config = ReplicatorConfig::from_lookup(lookup_from(&[
            ("BACKOFF_MIN_MINUTES", "5"),
            ("BACKOFF_MAX_MINUTES", "2"),
        ]));
        assert_eq!(config.backoff_max_minutes, 5);
    }
}
