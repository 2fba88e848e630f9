//! # Object Store
//!
//! Process-local mirror of remote objects, keyed by `namespace/name`.
//!
//! Reads are served from the mirror; after every successful remote write the
//! server-returned object replaces the cached copy so later operations in the
//! same process observe the new `resourceVersion` without a round trip.

use crate::replication::error::StoreError;
use crate::replication::object::Replicable;
use std::collections::HashMap;
use std::sync::RwLock;

/// Key-value cache of replicable objects
pub trait ObjectStore<K: Replicable>: Send + Sync {
    /// Look up an object by `namespace/name`
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the cache cannot be read.
    fn get(&self, key: &str) -> Result<Option<K>, StoreError>;

    /// Replace the cached copy of an object
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the object has no key or the cache cannot be written.
    fn put(&self, obj: K) -> Result<(), StoreError>;

    /// Evict an object, returning the cached copy if there was one
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the cache cannot be written.
    fn remove(&self, key: &str) -> Result<Option<K>, StoreError>;
}

/// In-memory [`ObjectStore`]
#[derive(Debug)]
pub struct MemoryStore<K> {
    objects: RwLock<HashMap<String, K>>,
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Replicable> MemoryStore<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing objects
    ///
    /// # Errors
    ///
    /// Fails on the first object without a namespace or name.
    pub fn with_objects<I>(objects: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = K>,
    {
        let store = Self::new();
        for obj in objects {
            store.put(obj)?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Replicable> ObjectStore<K> for MemoryStore<K> {
    fn get(&self, key: &str) -> Result<Option<K>, StoreError> {
        let objects = self.objects.read().map_err(|_poison| StoreError::Poisoned)?;
        Ok(objects.get(key).cloned())
    }

    fn put(&self, obj: K) -> Result<(), StoreError> {
        let key = store_key(&obj)?;
        let mut objects = self.objects.write().map_err(|_poison| StoreError::Poisoned)?;
        objects.insert(key, obj);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<Option<K>, StoreError> {
        let mut objects = self.objects.write().map_err(|_poison| StoreError::Poisoned)?;
        Ok(objects.remove(key))
    }
}

fn store_key<K: Replicable>(obj: &K) -> Result<String, StoreError> {
    let meta = obj.meta();
    let name = meta.name.as_deref().ok_or(StoreError::MissingIdentity("name"))?;
    let namespace = meta
        .namespace
        .as_deref()
        .ok_or(StoreError::MissingIdentity("namespace"))?;
    Ok(format!("{namespace}/{name}"))
}
