//! # Replicable Objects
//!
//! Capability trait over the concrete resource kinds replication can copy.
//!
//! Operations are generic over [`Replicable`], so the concrete kind is resolved
//! once where the dispatcher picks the replicator instance and never re-checked
//! inside the business logic.

use crate::replication::error::ReplicationError;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::Resource;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

/// A namespaced object holding a key to value data map
pub trait Replicable:
    Resource<DynamicType = ()> + Clone + Default + Debug + Send + Sync + 'static
{
    /// Value stored under each data key; cloning must produce an owned copy
    type Value: Clone + PartialEq + Debug + Send + Sync;

    /// Kind name used in logs and error messages
    const KIND: &'static str;

    fn data(&self) -> Option<&BTreeMap<String, Self::Value>>;

    /// Mutable access to the data map, creating it when absent
    fn data_mut(&mut self) -> &mut BTreeMap<String, Self::Value>;

    /// Variant discriminator of the kind (e.g. the Secret `type`), if it has one
    fn variant(&self) -> Option<&str>;

    fn set_variant(&mut self, variant: Option<String>);
}

impl Replicable for Secret {
    type Value = ByteString;

    const KIND: &'static str = "Secret";

    fn data(&self) -> Option<&BTreeMap<String, ByteString>> {
        self.data.as_ref()
    }

    fn data_mut(&mut self) -> &mut BTreeMap<String, ByteString> {
        self.data.get_or_insert_with(BTreeMap::new)
    }

    fn variant(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    fn set_variant(&mut self, variant: Option<String>) {
        self.type_ = variant;
    }
}

/// Identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub namespace: String,
    pub name: String,
}

impl ObjectRef {
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Store key in `namespace/name` form
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Get the identity of an object
///
/// # Errors
///
/// Returns [`ReplicationError::MalformedObject`] when the object has no name or
/// no namespace.
pub fn object_ref<K: Replicable>(obj: &K) -> Result<ObjectRef, ReplicationError> {
    let meta = obj.meta();
    let name = meta
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ReplicationError::MalformedObject {
            kind: K::KIND,
            reason: "object has no name".to_string(),
        })?;
    let namespace = meta
        .namespace
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ReplicationError::MalformedObject {
            kind: K::KIND,
            reason: format!("object {name} has no namespace"),
        })?;
    Ok(ObjectRef::new(namespace, name))
}

/// Get the `resourceVersion` of an object
///
/// # Errors
///
/// Returns [`ReplicationError::MalformedObject`] when the version is unset; an
/// object without one cannot be tracked for freshness.
pub fn resource_version<K: Replicable>(obj: &K) -> Result<&str, ReplicationError> {
    obj.meta()
        .resource_version
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReplicationError::MalformedObject {
            kind: K::KIND,
            reason: format!(
                "object {} has no resourceVersion",
                obj.meta().name.as_deref().unwrap_or("unknown")
            ),
        })
}

/// Read a single annotation value
pub fn annotation<'a, K: Replicable>(obj: &'a K, key: &str) -> Option<&'a str> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|ann| ann.get(key))
        .map(String::as_str)
}
