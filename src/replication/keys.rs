//! # Owned Keys
//!
//! Typed view of the replication-owned key set and the annotation helpers that
//! persist it.
//!
//! The annotation string is only ever parsed or produced here; the rest of the
//! crate works with [`OwnedKeys`].

use crate::constants::{
    KEY_SEPARATOR, PREVIOUSLY_PRESENT_KEYS_ANNOTATION, REPLICATED_AT_ANNOTATION,
    REPLICATED_FROM_VERSION_ANNOTATION, REPLICATED_KEYS_ANNOTATION,
};
use crate::replication::object::{annotation, Replicable};
use chrono::{DateTime, SecondsFormat, Utc};
use kube::api::ObjectMeta;
use std::collections::{BTreeMap, BTreeSet};

/// Sorted set of data keys written by replication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedKeys(BTreeSet<String>);

impl OwnedKeys {
    /// Parse a comma-joined annotation value
    ///
    /// Empty segments are ignored, so `""` parses to the empty set.
    #[must_use]
    pub fn from_annotation(value: &str) -> Self {
        value
            .split(KEY_SEPARATOR)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Serialize as the sorted, comma-joined annotation value
    #[must_use]
    pub fn to_annotation(&self) -> String {
        let keys: Vec<&str> = self.0.iter().map(String::as_str).collect();
        keys.join(KEY_SEPARATOR)
    }

    /// Key set of a data map
    #[must_use]
    pub fn from_data<V>(data: Option<&BTreeMap<String, V>>) -> Self {
        data.map(|d| d.keys().cloned().collect()).unwrap_or_default()
    }

    /// Keys recorded by an earlier replication write, if any record exists
    ///
    /// `replicated-keys` wins; the previously-present marker is the fallback.
    #[must_use]
    pub fn previous(meta: &ObjectMeta) -> Option<Self> {
        let annotations = meta.annotations.as_ref()?;
        annotations
            .get(REPLICATED_KEYS_ANNOTATION)
            .or_else(|| annotations.get(PREVIOUSLY_PRESENT_KEYS_ANNOTATION))
            .map(|value| Self::from_annotation(value))
    }

    pub fn insert(&mut self, key: String) -> bool {
        self.0.insert(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in `self` that are not in `other`, in sorted order
    #[must_use]
    pub fn difference(&self, other: &OwnedKeys) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }
}

impl FromIterator<String> for OwnedKeys {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Sorted, comma-joined key list of a data map
#[must_use]
pub fn sorted_key_list<V>(data: Option<&BTreeMap<String, V>>) -> String {
    OwnedKeys::from_data(data).to_annotation()
}

/// Result of merging a source's data into a target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Keys copied from the source in this round
    pub owned: OwnedKeys,
    /// Previously replicated keys dropped because the source no longer has them
    pub removed: Vec<String>,
}

/// Copy all source data into `target` and drop stale replicated keys
///
/// Keys that are neither in the source nor in `previous` are foreign and stay
/// untouched. Values are cloned so the target never aliases source buffers.
pub fn merge_source_data<K: Replicable>(
    target: &mut K,
    source: &K,
    previous: Option<&OwnedKeys>,
) -> MergeReport {
    let data = target.data_mut();
    let mut owned = OwnedKeys::default();

    if let Some(source_data) = source.data() {
        for (key, value) in source_data {
            data.insert(key.clone(), value.clone());
            owned.insert(key.clone());
        }
    }

    let removed = previous.map(|prev| prev.difference(&owned)).unwrap_or_default();
    for key in &removed {
        data.remove(key);
    }

    MergeReport { owned, removed }
}

/// Whether the target already carries the given source version
#[must_use]
pub fn is_up_to_date<K: Replicable>(target: &K, source_version: &str) -> bool {
    annotation(target, REPLICATED_FROM_VERSION_ANNOTATION)
        == Some(source_version)
}

/// Write the three replication annotations
pub fn stamp_replication(
    meta: &mut ObjectMeta,
    source_version: &str,
    owned: &OwnedKeys,
    now: DateTime<Utc>,
) {
    let annotations = meta.annotations.get_or_insert_with(BTreeMap::new);
    annotations.insert(
        REPLICATED_AT_ANNOTATION.to_string(),
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    annotations.insert(
        REPLICATED_FROM_VERSION_ANNOTATION.to_string(),
        source_version.to_string(),
    );
    annotations.insert(REPLICATED_KEYS_ANNOTATION.to_string(), owned.to_annotation());
}
