//! Common test utilities for replication integration tests
//!
//! Provides an in-memory stand-in for the API server that records every call,
//! plus fixture builders for secrets.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use secret_replicator::constants::REPLICATED_KEYS_ANNOTATION;
use secret_replicator::replication::{
    ObjectStore, Operation, PermissionGate, StoreError, TargetApi,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Call recorded by [`FakeApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub key: String,
}

#[derive(Debug, Default)]
struct ServerState {
    objects: HashMap<String, Secret>,
    calls: Vec<Call>,
    next_version: u64,
    fail: Option<Operation>,
}

/// In-memory API server for secrets
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<ServerState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.state.lock().unwrap().next_version = 100;
        api
    }

    /// Store an object server-side as if another actor had created it
    pub fn seed(&self, secret: Secret) {
        let key = key_of(&secret);
        self.state.lock().unwrap().objects.insert(key, secret);
    }

    /// Make every subsequent call of `operation` fail
    pub fn fail_on(&self, operation: Operation) {
        self.state.lock().unwrap().fail = Some(operation);
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        self.state.lock().unwrap().fail = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn get(&self, key: &str) -> Option<Secret> {
        self.state.lock().unwrap().objects.get(key).cloned()
    }

    fn record(&self, operation: Operation, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            operation,
            key: key.to_string(),
        });
        if state.fail == Some(operation) {
            bail!("injected {operation} failure for {key}");
        }
        Ok(())
    }

    fn bump_version(&self, secret: &mut Secret) {
        let mut state = self.state.lock().unwrap();
        state.next_version += 1;
        secret.metadata.resource_version = Some(state.next_version.to_string());
    }
}

#[async_trait]
impl TargetApi<Secret> for FakeApi {
    async fn create(&self, namespace: &str, obj: &Secret) -> Result<Secret> {
        let key = format!("{namespace}/{}", obj.metadata.name.as_deref().unwrap_or_default());
        self.record(Operation::Create, &key)?;
        if self.get(&key).is_some() {
            bail!("secrets {key:?} already exists");
        }
        let mut created = obj.clone();
        created.metadata.namespace = Some(namespace.to_string());
        self.bump_version(&mut created);
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(key, created.clone());
        Ok(created)
    }

    async fn update(&self, namespace: &str, obj: &Secret) -> Result<Secret> {
        let key = format!("{namespace}/{}", obj.metadata.name.as_deref().unwrap_or_default());
        self.record(Operation::Update, &key)?;
        if self.get(&key).is_none() {
            bail!("secrets {key:?} not found");
        }
        let mut updated = obj.clone();
        self.bump_version(&mut updated);
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(key, updated.clone());
        Ok(updated)
    }

    async fn patch(&self, namespace: &str, name: &str, patch: &serde_json::Value) -> Result<Secret> {
        let key = format!("{namespace}/{name}");
        self.record(Operation::Patch, &key)?;
        let mut patched = self
            .get(&key)
            .ok_or_else(|| anyhow!("secrets {key:?} not found"))?;
        let ops = patch.as_array().ok_or_else(|| anyhow!("patch is not a list"))?;
        for op in ops {
            match (op["op"].as_str(), op["path"].as_str()) {
                (Some("remove"), Some("/data")) => patched.data = None,
                other => bail!("unsupported patch operation {other:?}"),
            }
        }
        self.bump_version(&mut patched);
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(key, patched.clone());
        Ok(patched)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let key = format!("{namespace}/{name}");
        self.record(Operation::Delete, &key)?;
        self.state
            .lock()
            .unwrap()
            .objects
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| anyhow!("secrets {key:?} not found"))
    }
}

/// Store that is always empty and whose writes always fail
#[derive(Debug, Default)]
pub struct BrokenStore;

impl ObjectStore<Secret> for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<Secret>, StoreError> {
        Ok(None)
    }

    fn put(&self, _obj: Secret) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }

    fn remove(&self, _key: &str) -> Result<Option<Secret>, StoreError> {
        Err(StoreError::Poisoned)
    }
}

/// Store whose reads always fail
#[derive(Debug, Default)]
pub struct UnreadableStore;

impl ObjectStore<Secret> for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<Secret>, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn put(&self, _obj: Secret) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<Option<Secret>, StoreError> {
        Ok(None)
    }
}

/// Gate that denies everything with a fixed reason
#[derive(Debug, Default)]
pub struct DenyAll;

impl PermissionGate for DenyAll {
    fn check(&self, _target: &ObjectMeta, _source: &ObjectMeta) -> Result<(), String> {
        Err("replication disabled for test".to_string())
    }
}

pub fn key_of(secret: &Secret) -> String {
    format!(
        "{}/{}",
        secret.metadata.namespace.as_deref().unwrap_or_default(),
        secret.metadata.name.as_deref().unwrap_or_default()
    )
}

/// Build a secret with string values
pub fn secret(namespace: &str, name: &str, version: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some(version.to_string()),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Secret::default()
    }
}

pub fn with_annotation(mut secret: Secret, key: &str, value: &str) -> Secret {
    secret
        .metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value.to_string());
    secret
}

pub fn with_replicated_keys(secret: Secret, keys: &str) -> Secret {
    with_annotation(secret, REPLICATED_KEYS_ANNOTATION, keys)
}

/// Data of a secret as sorted `(key, value)` string pairs
pub fn data_of(secret: &Secret) -> Vec<(String, String)> {
    secret
        .data
        .as_ref()
        .map(|data| {
            data.iter()
                .map(|(k, v)| (k.clone(), String::from_utf8_lossy(&v.0).into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn annotation_of<'a>(secret: &'a Secret, key: &str) -> Option<&'a str> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|ann| ann.get(key))
        .map(String::as_str)
}
