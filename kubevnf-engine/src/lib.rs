//! KubeVNF Engine - resource-type-pluggable VNF orchestration over
//! Kubernetes.
//!
//! A VNF instance is a named group of cluster resources created from a
//! declarative package: an ordered manifest plus one YAML definition per
//! resource. The engine dispatches each definition to a handler selected
//! by resource type, names every created object after the instance's
//! identity, and reverses the process on teardown using the ownership
//! record it returned at creation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kubevnf_engine::{CsarDirectory, VnfOrchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = kubevnf_engine::get_kube_client().await?;
//! let packages = Arc::new(CsarDirectory::new("/var/csar"));
//! let orchestrator = VnfOrchestrator::kubernetes(client, packages);
//!
//! let created = orchestrator
//!     .create_vnf("pkgA", "cloud1", "tenantA", &CancellationToken::new())
//!     .await?;
//! println!("{} -> {:?}", created.external_id, created.resources);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod identity;
pub mod kube_client;
pub mod manifest;
pub mod orchestrator;
pub mod package;
pub mod registry;

// Re-export key types for convenience
pub use error::{CreateFailure, DestroyFailure, EngineError};
pub use handlers::{NamespaceHandler, NamespaceLifecycle, ResourceHandler};
pub use identity::{ResourceName, VnfIdentity};
pub use kube_client::get_kube_client;
pub use manifest::{Manifest, ManifestEntry};
pub use orchestrator::{CreatedVnf, VnfOrchestrator};
pub use package::{CsarDirectory, PackageStore, MANIFEST_FILE};
pub use registry::HandlerRegistry;
