//! # Data Merge
//!
//! Updates an existing target's data from its source in place.

use crate::observability::metrics;
use crate::replication::error::{Operation, ReplicationError};
use crate::replication::keys::{is_up_to_date, merge_source_data, stamp_replication, OwnedKeys};
use crate::replication::object::{object_ref, resource_version, ObjectRef, Replicable};
use crate::replication::replicator::{ReplicationOutcome, Replicator};
use chrono::Utc;
use tracing::{debug, info, Instrument};

impl<K: Replicable> Replicator<K> {
    /// Copy the source's data into an existing target
    ///
    /// Keys the target held because of earlier replication and that the source
    /// no longer has are removed; foreign keys and every other field of the
    /// target are preserved. A target already at the source's
    /// `resourceVersion` is left alone.
    ///
    /// # Errors
    ///
    /// - [`ReplicationError::PermissionDenied`] before anything is written
    /// - [`ReplicationError::Transport`] when the update is rejected
    /// - [`ReplicationError::CacheSync`] when the write succeeded but the cache refresh did not
    pub async fn replicate_data_from(
        &self,
        source: &K,
        target: &K,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        let source_ref = object_ref(source)?;
        let target_ref = object_ref(target)?;
        let span = tracing::info_span!(
            "replication.data_from",
            kind = K::KIND,
            source = %source_ref,
            target = %target_ref
        );

        let result = self
            .sync_target_data(source, target, &source_ref, &target_ref)
            .instrument(span)
            .await;
        self.settle("replicate_data_from", &target_ref, result)
    }

    async fn sync_target_data(
        &self,
        source: &K,
        target: &K,
        source_ref: &ObjectRef,
        target_ref: &ObjectRef,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        self.gate
            .check(target.meta(), source.meta())
            .map_err(|reason| ReplicationError::PermissionDenied {
                source_key: source_ref.key(),
                target: target_ref.key(),
                reason,
            })?;

        let source_version = resource_version(source)?;
        if is_up_to_date(target, source_version) {
            debug!("target {} is already up-to-date", target_ref);
            metrics::increment_skipped(K::KIND, "up-to-date");
            return Ok(ReplicationOutcome::UpToDate);
        }

        let mut target_copy = target.clone();
        let previous = OwnedKeys::previous(target_copy.meta());
        let report = merge_source_data(&mut target_copy, source, previous.as_ref());
        for key in &report.removed {
            debug!(key = %key, "removing previously present key: not present in source any more");
        }
        stamp_replication(
            target_copy.meta_mut(),
            source_version,
            &report.owned,
            Utc::now(),
        );

        info!(
            keys = report.owned.len(),
            removed = report.removed.len(),
            "updating target {}", target_ref
        );
        let updated = self
            .api
            .update(&target_ref.namespace, &target_copy)
            .await
            .map_err(|err| ReplicationError::Transport {
                operation: Operation::Update,
                kind: K::KIND,
                target: target_ref.key(),
                source: err,
            })?;
        metrics::increment_writes(K::KIND, Operation::Update.as_str());

        self.store
            .put(updated.clone())
            .map_err(|err| ReplicationError::CacheSync {
                target: target_ref.key(),
                source: err,
            })?;

        Ok(ReplicationOutcome::Updated(updated))
    }
}
