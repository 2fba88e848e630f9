//! # Constants
//!
//! Shared constants used throughout the replicator.
//!
//! Annotation keys are persisted on target objects and must stay stable across
//! releases: changing them orphans every replica written by an older version.

/// Timestamp (RFC 3339) of the last successful replication write
pub const REPLICATED_AT_ANNOTATION: &str = "replicator.v1.mittwald.de/replicated-at";

/// Source `resourceVersion` that produced the target's current data
pub const REPLICATED_FROM_VERSION_ANNOTATION: &str =
    "replicator.v1.mittwald.de/replicated-from-version";

/// Sorted, comma-joined list of keys written by replication
pub const REPLICATED_KEYS_ANNOTATION: &str = "replicator.v1.mittwald.de/replicated-keys";

/// Keys recorded from an earlier state; consulted when `replicated-keys` is absent
pub const PREVIOUSLY_PRESENT_KEYS_ANNOTATION: &str =
    "replicator.v1.mittwald.de/previously-present-keys";

/// Source opt-in flag for pull-based replication
pub const REPLICATION_ALLOWED_ANNOTATION: &str = "replicator.v1.mittwald.de/replication-allowed";

/// Comma-separated namespace patterns a source may be replicated into
pub const REPLICATION_ALLOWED_NAMESPACES_ANNOTATION: &str =
    "replicator.v1.mittwald.de/replication-allowed-namespaces";

/// Separator used when joining key lists into a single annotation value
pub const KEY_SEPARATOR: &str = ",";

/// JSON Patch path of the data payload removed by dependent clearing
pub const DATA_PATCH_PATH: &str = "/data";

/// Default minimum Fibonacci backoff for failed replications (minutes)
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;

/// Default maximum Fibonacci backoff for failed replications (minutes)
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "secret_replicator=info";
