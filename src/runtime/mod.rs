//! # Runtime
//!
//! Retry policy helpers for the dispatcher that drives the replicator.

pub mod backoff;
pub mod error_policy;

pub use backoff::{BackoffRegistry, FibonacciBackoff};
pub use error_policy::error_policy;
