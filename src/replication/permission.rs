//! # Replication Permissions
//!
//! Decides whether a source may be replicated into a target namespace.
//!
//! Sources opt in with two annotations:
//! - `replicator.v1.mittwald.de/replication-allowed: "true"`
//! - `replicator.v1.mittwald.de/replication-allowed-namespaces: "team-.*,staging"`
//!
//! Each namespace entry is a regular expression anchored to the whole
//! namespace name.

use crate::constants::{
    KEY_SEPARATOR, REPLICATION_ALLOWED_ANNOTATION, REPLICATION_ALLOWED_NAMESPACES_ANNOTATION,
};
use kube::api::ObjectMeta;
use regex::Regex;

/// Permission decision for a (target, source) pair
pub trait PermissionGate: Send + Sync {
    /// Check whether `source` may be replicated into `target`
    ///
    /// # Errors
    ///
    /// Returns a human-readable denial reason.
    fn check(&self, target: &ObjectMeta, source: &ObjectMeta) -> Result<(), String>;
}

/// Annotation-driven [`PermissionGate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationPermissionGate {
    allow_all: bool,
}

impl AnnotationPermissionGate {
    #[must_use]
    pub fn new(allow_all: bool) -> Self {
        Self { allow_all }
    }
}

impl PermissionGate for AnnotationPermissionGate {
    fn check(&self, target: &ObjectMeta, source: &ObjectMeta) -> Result<(), String> {
        if self.allow_all {
            return Ok(());
        }

        let source_key = format!(
            "{}/{}",
            source.namespace.as_deref().unwrap_or_default(),
            source.name.as_deref().unwrap_or_default()
        );
        let target_namespace = target.namespace.as_deref().unwrap_or_default();
        let annotations = source.annotations.as_ref();

        let allowed = annotations
            .and_then(|ann| ann.get(REPLICATION_ALLOWED_ANNOTATION))
            .and_then(|value| value.trim().parse::<bool>().ok())
            .unwrap_or(false);
        if !allowed {
            return Err(format!("source {source_key} does not allow replication"));
        }

        let patterns = annotations
            .and_then(|ann| ann.get(REPLICATION_ALLOWED_NAMESPACES_ANNOTATION))
            .ok_or_else(|| {
                format!(
                    "source {source_key} does not allow replication to namespace {target_namespace}"
                )
            })?;

        for pattern in patterns
            .split(KEY_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                format!("source {source_key} has invalid namespace pattern {pattern:?}: {e}")
            })?;
            if anchored.is_match(target_namespace) {
                return Ok(());
            }
        }

        Err(format!(
            "source {source_key} does not allow replication to namespace {target_namespace}"
        ))
    }
}
