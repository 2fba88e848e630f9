//! # Object Projection
//!
//! Creates or fully updates the copy of a source in a destination namespace.

use crate::observability::metrics;
use crate::replication::error::{Operation, ReplicationError};
use crate::replication::keys::{is_up_to_date, merge_source_data, stamp_replication, OwnedKeys};
use crate::replication::object::{object_ref, resource_version, ObjectRef, Replicable};
use crate::replication::replicator::{ReplicationOutcome, Replicator};
use chrono::Utc;
use tracing::{debug, info, Instrument};

impl<K: Replicable> Replicator<K> {
    /// Ensure `target_namespace` holds a copy of `source` under the source's name
    ///
    /// The cached object, if any, is the mutation base so its variant and other
    /// fields survive; otherwise a fresh object of the same kind is created.
    /// Pre-existing objects are updated, missing ones created.
    ///
    /// # Errors
    ///
    /// - [`ReplicationError::Cache`] when the cache lookup fails
    /// - [`ReplicationError::Transport`] when the create or update is rejected
    /// - [`ReplicationError::CacheSync`] when the write succeeded but the cache refresh did not
    pub async fn replicate_object_to(
        &self,
        source: &K,
        target_namespace: &str,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        let source_ref = object_ref(source)?;
        if target_namespace.is_empty() {
            return Err(ReplicationError::MalformedObject {
                kind: K::KIND,
                reason: format!("empty target namespace for {source_ref}"),
            });
        }
        let target_ref = ObjectRef::new(target_namespace, &source_ref.name);
        let span = tracing::info_span!(
            "replication.object_to",
            kind = K::KIND,
            source = %source_ref,
            target = %target_ref
        );

        let result = self
            .project_to_target(source, &source_ref, &target_ref)
            .instrument(span)
            .await;
        self.settle("replicate_object_to", &target_ref, result)
    }

    async fn project_to_target(
        &self,
        source: &K,
        source_ref: &ObjectRef,
        target_ref: &ObjectRef,
    ) -> Result<ReplicationOutcome<K>, ReplicationError> {
        let source_version = resource_version(source)?;
        let cached = self
            .store
            .get(&target_ref.key())
            .map_err(|err| ReplicationError::Cache {
                key: target_ref.key(),
                source: err,
            })?;
        let exists = cached.is_some();
        debug!(exists, "checked cache for {}", target_ref);

        let mut resource_copy = match cached {
            Some(existing) if is_up_to_date(&existing, source_version) => {
                debug!("{} {} is already up-to-date", K::KIND, target_ref);
                metrics::increment_skipped(K::KIND, "up-to-date");
                return Ok(ReplicationOutcome::UpToDate);
            }
            Some(existing) => existing,
            None => K::default(),
        };

        let previous = OwnedKeys::previous(resource_copy.meta());
        let report = merge_source_data(&mut resource_copy, source, previous.as_ref());
        for key in &report.removed {
            debug!(key = %key, "removing previously present key: not present in source any more");
        }

        let meta = resource_copy.meta_mut();
        meta.name = Some(target_ref.name.clone());
        meta.namespace = Some(target_ref.namespace.clone());
        stamp_replication(meta, source_version, &report.owned, Utc::now());
        if resource_copy.variant().is_none() {
            resource_copy.set_variant(source.variant().map(str::to_string));
        }

        let (operation, result) = if exists {
            debug!("updating existing {} {}", K::KIND, target_ref);
            (
                Operation::Update,
                self.api.update(&target_ref.namespace, &resource_copy).await,
            )
        } else {
            debug!("creating a new {} {}", K::KIND, target_ref);
            (
                Operation::Create,
                self.api.create(&target_ref.namespace, &resource_copy).await,
            )
        };
        let written = result.map_err(|err| ReplicationError::Transport {
            operation,
            kind: K::KIND,
            target: target_ref.key(),
            source: err,
        })?;
        metrics::increment_writes(K::KIND, operation.as_str());
        info!(
            operation = operation.as_str(),
            keys = report.owned.len(),
            "replicated {} to {}", source_ref, target_ref
        );

        self.store
            .put(written.clone())
            .map_err(|err| ReplicationError::CacheSync {
                target: target_ref.key(),
                source: err,
            })?;

        Ok(match operation {
            Operation::Create => ReplicationOutcome::Created(written),
            _ => ReplicationOutcome::Updated(written),
        })
    }
}
