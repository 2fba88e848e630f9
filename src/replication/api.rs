//! # Target API
//!
//! Remote verbs issued against a destination namespace.
//!
//! The core chooses between create and update explicitly because the API server
//! answers them with different conflict semantics (already-exists vs not-found).

use crate::replication::object::Replicable;
use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write access to objects of one kind, per destination namespace
#[async_trait]
pub trait TargetApi<K: Replicable>: Send + Sync {
    /// Create a new object, returning the server's copy
    async fn create(&self, namespace: &str, obj: &K) -> Result<K>;

    /// Replace an existing object, returning the server's copy
    async fn update(&self, namespace: &str, obj: &K) -> Result<K>;

    /// Apply an RFC 6902 JSON Patch to an object
    async fn patch(&self, namespace: &str, name: &str, patch: &serde_json::Value) -> Result<K>;

    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// [`TargetApi`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeTargetApi {
    client: Client,
}

impl std::fmt::Debug for KubeTargetApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeTargetApi").finish_non_exhaustive()
    }
}

impl KubeTargetApi {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> TargetApi<K> for KubeTargetApi
where
    K: Replicable + Resource<Scope = NamespaceResourceScope> + Serialize + DeserializeOwned,
{
    async fn create(&self, namespace: &str, obj: &K) -> Result<K> {
        self.api::<K>(namespace)
            .create(&PostParams::default(), obj)
            .await
            .context("create request rejected")
    }

    async fn update(&self, namespace: &str, obj: &K) -> Result<K> {
        let name = obj
            .meta()
            .name
            .as_deref()
            .context("object to update has no name")?;
        self.api::<K>(namespace)
            .replace(name, &PostParams::default(), obj)
            .await
            .context("replace request rejected")
    }

    async fn patch(&self, namespace: &str, name: &str, patch: &serde_json::Value) -> Result<K> {
        let patch: json_patch::Patch =
            serde_json::from_value(patch.clone()).context("patch body is not a JSON Patch")?;
        self.api::<K>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Json::<()>(patch))
            .await
            .context("patch request rejected")
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.api::<K>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .context("delete request rejected")?;
        Ok(())
    }
}
