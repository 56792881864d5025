//! Namespace handler.
//!
//! Namespaces are cluster-scoped and double as the orchestrator's
//! precondition step: before any resource of an instance is created, the
//! target namespace is checked and created if absent. The handler also
//! implements the full `ResourceHandler` capability set so `namespace` can
//! appear as an ordinary resource type in a package manifest.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, ResourceExt};

use crate::error::EngineError;
use crate::handlers::{is_api_error, NamespaceLifecycle, ResourceHandler};

pub struct NamespaceHandler {
    client: Client,
}

impl NamespaceHandler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn cluster_error(operation: &'static str, name: &str, source: kube::Error) -> EngineError {
        EngineError::Cluster {
            operation,
            kind: "Namespace".to_string(),
            name: name.to_string(),
            namespace: String::new(),
            source,
        }
    }

    async fn submit(&self, namespace: Namespace, tolerate_conflict: bool) -> Result<String, EngineError> {
        let name = namespace.name_any();
        match self.api().create(&PostParams::default(), &namespace).await {
            Ok(created) => Ok(created.name_any()),
            Err(e) if tolerate_conflict && is_api_error(&e, 409) => Ok(name),
            Err(e) => Err(Self::cluster_error("create", &name, e)),
        }
    }
}

#[async_trait]
impl NamespaceLifecycle for NamespaceHandler {
    async fn exists(&self, namespace: &str) -> Result<bool, EngineError> {
        match self.api().get(namespace).await {
            Ok(_) => Ok(true),
            Err(e) if is_api_error(&e, 404) => Ok(false),
            Err(e) => Err(Self::cluster_error("get", namespace, e)),
        }
    }

    async fn ensure(&self, namespace: &str) -> Result<(), EngineError> {
        tracing::debug!(namespace, "ensuring namespace exists");

        let object = Namespace {
            metadata: ObjectMeta {
                name: Some(namespace.to_string()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };
        self.submit(object, true).await.map(|_| ())
    }
}

#[async_trait]
impl ResourceHandler for NamespaceHandler {
    fn resource_type(&self) -> &str {
        "namespace"
    }

    // Namespaces are cluster-scoped; the namespace argument is unused.
    async fn create(
        &self,
        definition: &[u8],
        _namespace: &str,
        owner_id: &str,
    ) -> Result<String, EngineError> {
        let mut object: Namespace =
            serde_yaml::from_slice(definition).map_err(|source| EngineError::Decode {
                resource_type: "namespace".to_string(),
                source,
            })?;

        let declared = object
            .metadata
            .name
            .clone()
            .ok_or_else(|| EngineError::MissingName {
                resource_type: "namespace".to_string(),
            })?;
        object.metadata.name = Some(format!("{owner_id}-{declared}"));

        self.submit(object, false).await
    }

    async fn delete(&self, name: &str, _namespace: &str) -> Result<(), EngineError> {
        match self.api().delete(name, &DeleteParams::foreground()).await {
            Ok(_) => Ok(()),
            Err(e) if is_api_error(&e, 404) => Err(EngineError::ResourceNotFound {
                kind: "Namespace".to_string(),
                name: name.to_string(),
                namespace: String::new(),
            }),
            Err(e) => Err(Self::cluster_error("delete", name, e)),
        }
    }

    async fn get(&self, name: &str, _namespace: &str) -> Result<bool, EngineError> {
        self.exists(name).await
    }

    async fn list(&self, _namespace: &str, limit: u32) -> Result<Vec<String>, EngineError> {
        let opts = ListParams::default().limit(limit);
        let list = self
            .api()
            .list(&opts)
            .await
            .map_err(|e| Self::cluster_error("list", "", e))?;

        Ok(list.items.iter().map(|item| item.name_any()).collect())
    }
}
