//! # Logging
//!
//! Tracing subscriber setup for hosts embedding the replicator.
//!
//! Per-call context travels as span fields (`kind`, `source`, `target`) created
//! by each operation, so nothing here holds request state.

use crate::config::ReplicatorConfig;
use crate::constants::DEFAULT_LOG_FILTER;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Build the env filter, preferring `RUST_LOG` over the configured level
#[must_use]
pub fn env_filter(config: &ReplicatorConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level.trim().to_lowercase();
        if level.is_empty() {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        } else {
            EnvFilter::new(format!("secret_replicator={level}"))
        }
    })
}

/// Install the global fmt subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &ReplicatorConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_ansi(config.log_enable_color)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}
