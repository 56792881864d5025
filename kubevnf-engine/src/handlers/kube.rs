//! Generic kube-backed handler for namespaced resource kinds.
//!
//! One implementation covers every namespaced kind that decodes from YAML
//! into a `k8s-openapi` type; the registry instantiates it per resource
//! type. Deletes use foreground propagation so dependents are gone before
//! the delete is reported done.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EngineError;
use crate::handlers::{effective_namespace, is_api_error, ResourceHandler};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;

pub type DeploymentHandler = KubeResourceHandler<Deployment>;
pub type ServiceHandler = KubeResourceHandler<Service>;

pub struct KubeResourceHandler<K> {
    client: Client,
    resource_type: &'static str,
    _kind: PhantomData<K>,
}

impl<K> KubeResourceHandler<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    pub fn new(client: Client, resource_type: &'static str) -> Self {
        Self {
            client,
            resource_type,
            _kind: PhantomData,
        }
    }

    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), effective_namespace(namespace))
    }

    fn kind() -> String {
        K::kind(&K::DynamicType::default()).into_owned()
    }

    fn cluster_error(
        operation: &'static str,
        name: &str,
        namespace: &str,
        source: kube::Error,
    ) -> EngineError {
        EngineError::Cluster {
            operation,
            kind: Self::kind(),
            name: name.to_string(),
            namespace: effective_namespace(namespace).to_string(),
            source,
        }
    }
}

#[async_trait]
impl<K> ResourceHandler for KubeResourceHandler<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    fn resource_type(&self) -> &str {
        self.resource_type
    }

    async fn create(
        &self,
        definition: &[u8],
        namespace: &str,
        owner_id: &str,
    ) -> Result<String, EngineError> {
        let mut resource: K =
            serde_yaml::from_slice(definition).map_err(|source| EngineError::Decode {
                resource_type: self.resource_type.to_string(),
                source,
            })?;

        let declared = resource
            .meta()
            .name
            .clone()
            .ok_or_else(|| EngineError::MissingName {
                resource_type: self.resource_type.to_string(),
            })?;

        let namespace = effective_namespace(namespace);
        let internal_name = format!("{owner_id}-{declared}");
        resource.meta_mut().name = Some(internal_name.clone());
        resource.meta_mut().namespace = Some(namespace.to_string());

        tracing::debug!(
            kind = %Self::kind(),
            name = %internal_name,
            namespace,
            "creating resource"
        );

        let created = self
            .api(namespace)
            .create(&PostParams::default(), &resource)
            .await
            .map_err(|e| Self::cluster_error("create", &internal_name, namespace, e))?;

        Ok(created.name_any())
    }

    async fn delete(&self, name: &str, namespace: &str) -> Result<(), EngineError> {
        tracing::debug!(kind = %Self::kind(), name, namespace, "deleting resource");

        match self.api(namespace).delete(name, &DeleteParams::foreground()).await {
            Ok(_) => Ok(()),
            Err(e) if is_api_error(&e, 404) => Err(EngineError::ResourceNotFound {
                kind: Self::kind(),
                name: name.to_string(),
                namespace: effective_namespace(namespace).to_string(),
            }),
            Err(e) => Err(Self::cluster_error("delete", name, namespace, e)),
        }
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<bool, EngineError> {
        match self.api(namespace).get(name).await {
            Ok(_) => Ok(true),
            Err(e) if is_api_error(&e, 404) => Ok(false),
            Err(e) => Err(Self::cluster_error("get", name, namespace, e)),
        }
    }

    async fn list(&self, namespace: &str, limit: u32) -> Result<Vec<String>, EngineError> {
        let opts = ListParams::default().limit(limit);
        let list = self
            .api(namespace)
            .list(&opts)
            .await
            .map_err(|e| Self::cluster_error("list", "", namespace, e))?;

        Ok(list.items.iter().map(|item| item.name_any()).collect())
    }
}
