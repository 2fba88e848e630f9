//! # Guarded Deletion
//!
//! Deletes a replica only while it holds exactly the keys replication wrote.
//!
//! The check compares key sets, not values: a replicated key whose value was
//! edited externally still counts as owned. It exists to keep foreign keys from
//! being destroyed together with the replica.

use crate::constants::REPLICATED_KEYS_ANNOTATION;
use crate::observability::metrics;
use crate::replication::error::{Operation, ReplicationError};
use crate::replication::keys::{sorted_key_list, OwnedKeys};
use crate::replication::object::{annotation, object_ref, ObjectRef, Replicable};
use crate::replication::replicator::{ReplicationOutcome, Replicator};
use tracing::{debug, info, Instrument};

impl<K: Replicable> Replicator<K> {
    /// Delete `target` if its current keys equal the recorded `replicated-keys`
    ///
    /// A mismatch is not an error: the object is kept and the outcome lists the
    /// keys that differ.
    ///
    /// # Errors
    ///
    /// - [`ReplicationError::Transport`] when the delete is rejected
    /// - [`ReplicationError::CacheSync`] when the object was deleted but is still cached
    pub async fn delete_replicated_resource(
        &self,
        target: &K,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        let target_ref = object_ref(target)?;
        let span = tracing::info_span!(
            "replication.delete",
            kind = K::KIND,
            target = %target_ref
        );

        let result = self
            .delete_if_owned(target, &target_ref)
            .instrument(span)
            .await;
        self.settle("delete_replicated_resource", &target_ref, result)
    }

    async fn delete_if_owned(
        &self,
        target: &K,
        target_ref: &ObjectRef,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        let resource_keys = sorted_key_list(target.data());
        let recorded_keys = annotation(target, REPLICATED_KEYS_ANNOTATION).unwrap_or_default();

        if resource_keys != recorded_keys {
            let current = OwnedKeys::from_annotation(&resource_keys);
            let recorded = OwnedKeys::from_annotation(recorded_keys);
            let unexpected_keys = current.difference(&recorded);
            let missing_keys = recorded.difference(&current);
            info!(
                unexpected = ?unexpected_keys,
                missing = ?missing_keys,
                "not deleting {} since it contains other keys than replicated", target_ref
            );
            metrics::increment_skipped(K::KIND, "foreign-keys");
            return Ok(ReplicationOutcome::Retained {
                unexpected_keys,
                missing_keys,
            });
        }

        debug!("deleting {} {}", K::KIND, target_ref);
        self.api
            .delete(&target_ref.namespace, &target_ref.name)
            .await
            .map_err(|err| ReplicationError::Transport {
                operation: Operation::Delete,
                kind: K::KIND,
                target: target_ref.key(),
                source: err,
            })?;
        metrics::increment_writes(K::KIND, Operation::Delete.as_str());

        self.store
            .remove(&target_ref.key())
            .map_err(|err| ReplicationError::CacheSync {
                target: target_ref.key(),
                source: err,
            })?;

        Ok(ReplicationOutcome::Deleted)
    }
}
