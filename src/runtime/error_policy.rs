//! # Error Policy
//!
//! Maps replication errors to requeue decisions for a `kube_runtime` controller.
//!
//! - Permission and shape errors wait for the object to change; retrying the
//!   same input cannot succeed.
//! - Cache refresh failures retry after the minimum delay; the remote write
//!   already happened and the next pass only re-reads.
//! - Transport and other transient errors back off per target.

use crate::observability::metrics;
use crate::replication::object::{object_ref, Replicable};
use crate::replication::ReplicationError;
use crate::runtime::backoff::BackoffRegistry;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Decide how to requeue `obj` after `error`
///
/// Signature matches the `error_policy` argument of `kube_runtime::Controller::run`.
pub fn error_policy<K: Replicable>(
    obj: Arc<K>,
    error: &ReplicationError,
    ctx: Arc<BackoffRegistry>,
) -> Action {
    let resource_key = object_ref(obj.as_ref()).map_or_else(|_| "unknown".to_string(), |r| r.key());

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "replication.error_policy",
        kind = K::KIND,
        target = %resource_key,
        reason = error.reason()
    );
    let _error_guard = error_span.enter();

    match error {
        ReplicationError::PermissionDenied { .. } | ReplicationError::MalformedObject { .. } => {
            warn!("Not retrying {}: {}; waiting for a change", resource_key, error);
            metrics::increment_requeues("await-change");
            Action::await_change()
        }
        ReplicationError::CacheSync { .. } => {
            let delay = ctx.min_delay();
            warn!(
                "Cache refresh failed for {}, re-reading in {}s: {}",
                resource_key,
                delay.as_secs(),
                error
            );
            metrics::increment_requeues("cache-sync");
            Action::requeue(delay)
        }
        ReplicationError::Cache { .. }
        | ReplicationError::Transport { .. }
        | ReplicationError::PatchEncode { .. } => {
            error!("Replication error for {}: {:?}", resource_key, error);
            let (delay, error_count) = ctx.next_delay(&resource_key);
            info!(
                "Retrying {} with Fibonacci backoff: {}s (error count: {})",
                resource_key,
                delay.as_secs(),
                error_count
            );
            metrics::increment_requeues("error-backoff");
            Action::requeue(delay)
        }
    }
}
