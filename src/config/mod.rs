//! # Configuration
//!
//! Replicator settings loaded from environment variables.

mod replicator;

pub use replicator::ReplicatorConfig;
