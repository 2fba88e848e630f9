//! # Dependent Clearing
//!
//! Strips the data payload from a target that must outlive replication.

use crate::observability::metrics;
use crate::replication::error::{Operation, ReplicationError};
use crate::replication::object::{object_ref, ObjectRef, Replicable};
use crate::replication::patch::clear_data_patch;
use crate::replication::replicator::{Replicator};
use tracing::{debug, trace, Instrument};

impl<K: Replicable> Replicator<K> {
    /// Remove the data of `target` with a single JSON Patch operation
    ///
    /// Only `/data` is touched, so concurrent writers editing other fields are
    /// not overwritten. Annotations and the cache are left to the caller.
    ///
    /// # Errors
    ///
    /// - [`ReplicationError::PatchEncode`] when the patch body cannot be built
    /// - [`ReplicationError::Transport`] when the patch is rejected
    pub async fn patch_delete_dependent(
        &self,
        source_key: &str,
        target: &K,
    ) -> Result<K, ReplicationError> {
        let target_ref = object_ref(target)?;
        let span = tracing::info_span!(
            "replication.clear_dependent",
            kind = K::KIND,
            source = %source_key,
            target = %target_ref
        );

        let result = self
            .clear_target_data(&target_ref)
            .instrument(span)
            .await;
        self.settle("patch_delete_dependent", &target_ref, result)
    }

    async fn clear_target_data(&self, target_ref: &ObjectRef) -> Result<K, ReplicationError> {
        let patch_body = serde_json::to_value(clear_data_patch()).map_err(|err| {
            ReplicationError::PatchEncode {
                target: target_ref.key(),
                source: err,
            }
        })?;

        debug!("clearing dependent {} {}", K::KIND, target_ref);
        trace!(patch = %patch_body, "patch body");

        let patched = self
            .api
            .patch(&target_ref.namespace, &target_ref.name, &patch_body)
            .await
            .map_err(|err| ReplicationError::Transport {
                operation: Operation::Patch,
                kind: K::KIND,
                target: target_ref.key(),
                source: err,
            })?;
        metrics::increment_writes(K::KIND, Operation::Patch.as_str());
        Ok(patched)
    }
}
