//! Secret Replicator Library
//!
//! Reconciliation core that copies a source Secret's data into replicas in
//! other namespaces, keeps them in sync, and tears them down or detaches them
//! without destroying data replication does not own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use secret_replicator::prelude::*;
//! use k8s_openapi::api::core::v1::Secret;
//! use std::sync::Arc;
//!
//! # async fn run(client: kube::Client, source: Secret) -> anyhow::Result<()> {
//! let config = ReplicatorConfig::from_env();
//! let replicator: Replicator<Secret> = Replicator::new(
//!     Arc::new(MemoryStore::<Secret>::new()),
//!     Arc::new(KubeTargetApi::new(client)),
//!     Arc::new(AnnotationPermissionGate::new(config.allow_all)),
//! );
//! replicator.replicate_object_to(&source, "team-a").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod observability;
pub mod prelude;
pub mod replication;
pub mod runtime;
