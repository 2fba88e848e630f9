//! # Errors
//!
//! Error taxonomy for replication operations.
//!
//! Every variant carries the identity of the object involved so a single log
//! line is enough to locate the failure.

use std::fmt;
use thiserror::Error;

/// Remote verbs issued against a target namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Patch,
    Delete,
}

impl Operation {
    /// Get the lowercase verb, used for log fields and metric labels
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by an [`ObjectStore`](crate::replication::store::ObjectStore)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
    #[error("object has no {0}, cannot derive a store key")]
    MissingIdentity(&'static str),
}

#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The permission gate refused replication; nothing was written
    #[error("replication of {source_key} to {target} is not permitted: {reason}")]
    PermissionDenied {
        source_key: String,
        target: String,
        reason: String,
    },

    /// An object handed to the core lacks the shape replication needs
    #[error("malformed {kind} object: {reason}")]
    MalformedObject { kind: &'static str, reason: String },

    /// Reading the local cache failed
    #[error("could not get {key} from cache")]
    Cache {
        key: String,
        #[source]
        source: StoreError,
    },

    /// A remote call failed
    #[error("failed to {operation} {kind} {target}")]
    Transport {
        operation: Operation,
        kind: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// The remote write succeeded but the cache refresh did not
    #[error("failed to update cache for {target} after successful write")]
    CacheSync {
        target: String,
        #[source]
        source: StoreError,
    },

    /// The JSON Patch body could not be serialized
    #[error("error while building patch body for {target}")]
    PatchEncode {
        target: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReplicationError {
    /// Whether retrying the same input can succeed without an external change
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ReplicationError::PermissionDenied { .. } | ReplicationError::MalformedObject { .. } => {
                false
            }
            ReplicationError::Cache { .. }
            | ReplicationError::Transport { .. }
            | ReplicationError::CacheSync { .. }
            | ReplicationError::PatchEncode { .. } => true,
        }
    }

    /// Short label used in metrics
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ReplicationError::PermissionDenied { .. } => "permission-denied",
            ReplicationError::MalformedObject { .. } => "malformed-object",
            ReplicationError::Cache { .. } => "cache-read",
            ReplicationError::Transport { .. } => "transport",
            ReplicationError::CacheSync { .. } => "cache-sync",
            ReplicationError::PatchEncode { .. } => "patch-encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_message_names_target() {
        let err = ReplicationError::Transport {
            operation: Operation::Update,
            kind: "Secret",
            target: "team-a/db-credentials".to_string(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert_eq!(err.to_string(), "failed to update Secret team-a/db-credentials");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_permission_denied_is_not_retryable() {
        let err = ReplicationError::PermissionDenied {
            source_key: "infra/tls".to_string(),
            target: "team-a/tls".to_string(),
            reason: "source does not allow replication".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.reason(), "permission-denied");
    }

    #[test]
    fn test_cache_sync_is_retryable() {
        let err = ReplicationError::CacheSync {
            target: "team-a/tls".to_string(),
            source: StoreError::Poisoned,
        };
        assert!(err.is_retryable());
    }
}
