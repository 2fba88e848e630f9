//! # Replicator
//!
//! Entry points of the replication core and the dispatch boundary that routes
//! one decided action to its operation.
//!
//! Which action applies to a (source, target) pair is decided by the caller;
//! the replicator only guarantees the semantics and safety checks of each one.

use crate::observability::metrics;
use crate::replication::api::TargetApi;
use crate::replication::error::ReplicationError;
use crate::replication::object::{ObjectRef, Replicable};
use crate::replication::permission::PermissionGate;
use crate::replication::store::ObjectStore;
use crate::runtime::BackoffRegistry;
use std::sync::Arc;
use tracing::warn;

/// What an operation did
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationOutcome<K> {
    /// Target already carries the source version; nothing was written
    UpToDate,
    Created(K),
    Updated(K),
    /// Data payload removed; the object itself remains
    Cleared(K),
    Deleted,
    /// Deletion refused because the target's keys differ from the recorded set
    Retained {
        /// Keys present on the target but not recorded as replicated
        unexpected_keys: Vec<String>,
        /// Recorded keys no longer present on the target
        missing_keys: Vec<String>,
    },
}

impl<K> ReplicationOutcome<K> {
    /// Whether a remote write was issued
    #[must_use]
    pub fn wrote(&self) -> bool {
        matches!(
            self,
            ReplicationOutcome::Created(_)
                | ReplicationOutcome::Updated(_)
                | ReplicationOutcome::Cleared(_)
                | ReplicationOutcome::Deleted
        )
    }
}

/// An action chosen by the dispatcher for one target
#[derive(Debug)]
pub enum ReplicationAction<'a, K> {
    /// Target exists and should follow the source
    SyncData { source: &'a K, target: &'a K },
    /// Target should exist in `target_namespace`, created if missing
    Project { source: &'a K, target_namespace: &'a str },
    /// Target must stop receiving data but survive
    ClearDependent { source_key: &'a str, target: &'a K },
    /// Target should be removed
    Delete { target: &'a K },
}

impl<K> ReplicationAction<'_, K> {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationAction::SyncData { .. } => "sync-data",
            ReplicationAction::Project { .. } => "project",
            ReplicationAction::ClearDependent { .. } => "clear-dependent",
            ReplicationAction::Delete { .. } => "delete",
        }
    }
}

/// Replication core for one resource kind
pub struct Replicator<K: Replicable> {
    pub(crate) store: Arc<dyn ObjectStore<K>>,
    pub(crate) api: Arc<dyn TargetApi<K>>,
    pub(crate) gate: Arc<dyn PermissionGate>,
    backoff: Option<Arc<BackoffRegistry>>,
}

impl<K: Replicable> Clone for Replicator<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            api: Arc::clone(&self.api),
            gate: Arc::clone(&self.gate),
            backoff: self.backoff.as_ref().map(Arc::clone),
        }
    }
}

impl<K: Replicable> std::fmt::Debug for Replicator<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replicator")
            .field("kind", &K::KIND)
            .field("backoff", &self.backoff.is_some())
            .finish_non_exhaustive()
    }
}

impl<K: Replicable> Replicator<K> {
    pub fn new(
        store: Arc<dyn ObjectStore<K>>,
        api: Arc<dyn TargetApi<K>>,
        gate: Arc<dyn PermissionGate>,
    ) -> Self {
        Self {
            store,
            api,
            gate,
            backoff: None,
        }
    }

    /// Clear a target's retry history in `registry` whenever an operation on it succeeds
    #[must_use]
    pub fn with_backoff(mut self, registry: Arc<BackoffRegistry>) -> Self {
        self.backoff = Some(registry);
        self
    }

    /// Route a decided action to its operation
    ///
    /// # Errors
    ///
    /// Propagates the error of the selected operation.
    pub async fn apply(
        &self,
        action: ReplicationAction<'_, K>,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        match action {
            ReplicationAction::SyncData { source, target } => {
                self.replicate_data_from(source, target).await
            }
            ReplicationAction::Project {
                source,
                target_namespace,
            } => self.replicate_object_to(source, target_namespace).await,
            ReplicationAction::ClearDependent { source_key, target } => self
                .patch_delete_dependent(source_key, target)
                .await
                .map(ReplicationOutcome::Cleared),
            ReplicationAction::Delete { target } => self.delete_replicated_resource(target).await,
        }
    }

    /// Record the result of an operation on `target`
    ///
    /// Failures are logged and counted; success resets the target's backoff.
    pub(crate) fn settle<T>(
        &self,
        operation: &'static str,
        target: &ObjectRef,
        result: Result<T, ReplicationError>,
    ) -> Result<T, ReplicationError> {
        match &result {
            Ok(_) => {
                if let Some(backoff) = &self.backoff {
                    backoff.reset(&target.key());
                }
            }
            Err(error) => record_failure::<K>(operation, error),
        }
        result
    }
}

fn record_failure<K: Replicable>(operation: &'static str, error: &ReplicationError) {
    warn!(
        kind = K::KIND,
        operation,
        reason = error.reason(),
        error = %error,
        "replication.failed"
    );
    metrics::increment_errors(K::KIND, error.reason());
}
