//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use secret_replicator::prelude::*;
//! ```

// Replication core
pub use crate::replication::{
    AnnotationPermissionGate, KubeTargetApi, MemoryStore, ObjectRef, ObjectStore, OwnedKeys,
    PermissionGate, Replicable, ReplicationAction, ReplicationError, ReplicationOutcome,
    Replicator, StoreError, TargetApi,
};

// Config types
pub use crate::config::ReplicatorConfig;

// Retry policy
pub use crate::runtime::{error_policy, BackoffRegistry, FibonacciBackoff};
