//! # Replication
//!
//! Synchronization and safety-guard protocol for copying a source object's data
//! into replicas in other namespaces.
//!
//! - [`Replicator::replicate_data_from`] merges source data into an existing target
//! - [`Replicator::replicate_object_to`] creates or updates a target by projection
//! - [`Replicator::patch_delete_dependent`] clears a target's data, keeping the object
//! - [`Replicator::delete_replicated_resource`] deletes a target that holds only owned keys
//!
//! Idempotency rests on the `replicated-from-version` annotation: a target
//! already carrying the source's `resourceVersion` is never written again.

pub mod api;
pub mod error;
pub mod keys;
pub mod object;
mod ops;
pub mod patch;
pub mod permission;
pub mod replicator;
pub mod store;

pub use api::{KubeTargetApi, TargetApi};
pub use error::{Operation, ReplicationError, StoreError};
pub use keys::OwnedKeys;
pub use object::{ObjectRef, Replicable};
pub use permission::{AnnotationPermissionGate, PermissionGate};
pub use replicator::{ReplicationAction, ReplicationOutcome, Replicator};
pub use store::{MemoryStore, ObjectStore};
