//! Error taxonomy for the orchestration engine.
//!
//! Three families matter to callers: configuration errors (an unregistered
//! resource type), not-found errors (missing definition files or cluster
//! objects), and cluster operation errors (the underlying API call failed).
//! Every variant carries enough context to name the offending resource.

use kubevnf_models::OwnershipRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No handler registered for a resource type. Always fatal to the
    /// enclosing call, never retried.
    #[error("no handler registered for resource type {0:?}")]
    HandlerNotFound(String),

    /// A definition file referenced by the manifest does not exist in the
    /// package.
    #[error("definition {path:?} does not exist in package {csar_id:?}")]
    DefinitionMissing { csar_id: String, path: String },

    /// A cluster object was absent when expected present.
    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    ResourceNotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    /// The underlying cluster call failed.
    #[error("{operation} {kind} {name:?} in namespace {namespace:?} failed")]
    Cluster {
        operation: &'static str,
        kind: String,
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    /// The package manifest exists but is not valid YAML of the expected
    /// shape.
    #[error("malformed manifest in package {csar_id:?}")]
    Manifest {
        csar_id: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A resource definition payload could not be decoded into the
    /// handler's native resource shape.
    #[error("failed to decode {resource_type} definition")]
    Decode {
        resource_type: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A resource definition carries no `metadata.name` to rewrite.
    #[error("{resource_type} definition has no metadata.name")]
    MissingName { resource_type: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Reading from the package store failed.
    #[error("package store error for {csar_id:?}")]
    PackageStore {
        csar_id: String,
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

/// Failure of `create_vnf`, carrying the resources created before the
/// failing step. No rollback is performed; the caller may compensate with
/// `destroy_vnf` on the partial record.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CreateFailure {
    #[source]
    pub error: EngineError,
    pub partial: OwnershipRecord,
}

/// Failure of `destroy_vnf`, carrying the names not yet deleted (the
/// failing one included). Retrying with the remaining record resumes the
/// teardown.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DestroyFailure {
    #[source]
    pub error: EngineError,
    pub remaining: OwnershipRecord,
}

impl EngineError {
    /// Whether this error is the 404 family, which idempotent-delete
    /// policies may choose to tolerate.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::ResourceNotFound { .. })
    }
}
