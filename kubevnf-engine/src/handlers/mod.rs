//! Per-resource-type handlers.
//!
//! A handler owns the full capability set for one resource type: decode the
//! raw definition payload, create the object in the cluster under its
//! internal name, and delete / get / list by name. Handlers are stateless,
//! registered once at startup, and live for the process.

use async_trait::async_trait;

use crate::error::EngineError;

pub mod kube;
pub mod namespace;

pub use self::kube::{DeploymentHandler, KubeResourceHandler, ServiceHandler};
pub use self::namespace::NamespaceHandler;

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The manifest resource-type name this handler is registered under.
    fn resource_type(&self) -> &str;

    /// Decode the definition, rewrite its name to `<owner_id>-<declared>`
    /// and its namespace, create it in the cluster, and return the name
    /// actually assigned.
    async fn create(
        &self,
        definition: &[u8],
        namespace: &str,
        owner_id: &str,
    ) -> Result<String, EngineError>;

    /// Delete by internal name. A missing object is reported as
    /// `ResourceNotFound`; tolerating it is the caller's policy.
    async fn delete(&self, name: &str, namespace: &str) -> Result<(), EngineError>;

    /// Whether an object with this internal name exists.
    async fn get(&self, name: &str, namespace: &str) -> Result<bool, EngineError>;

    /// Names of objects of this type in the namespace, up to `limit`.
    async fn list(&self, namespace: &str, limit: u32) -> Result<Vec<String>, EngineError>;
}

impl std::fmt::Debug for dyn ResourceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("resource_type", &self.resource_type())
            .finish()
    }
}

/// Namespace existence precondition used by the orchestrator before any
/// resource is created.
#[async_trait]
pub trait NamespaceLifecycle: Send + Sync {
    async fn exists(&self, namespace: &str) -> Result<bool, EngineError>;

    /// Create the namespace. Tolerates an already existing namespace so
    /// that concurrent instantiations into the same namespace do not race
    /// each other into spurious failures.
    async fn ensure(&self, namespace: &str) -> Result<(), EngineError>;
}

/// An unset namespace falls back to the cluster default.
pub(crate) fn effective_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        "default"
    } else {
        namespace
    }
}

pub(crate) fn is_api_error(err: &::kube::Error, code: u16) -> bool {
    matches!(err, ::kube::Error::Api(response) if response.code == code)
}
