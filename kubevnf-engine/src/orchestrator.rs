//! VNF orchestrator: instantiate and tear down a named group of cluster
//! resources as a unit.
//!
//! Creation is strictly sequential in manifest order, because that order
//! encodes dependency order. There is no rollback: on failure the caller
//! receives the partial ownership record alongside the error and decides
//! whether to compensate with `destroy_vnf`.

use std::sync::Arc;

use kube::Client;
use tokio_util::sync::CancellationToken;

use kubevnf_models::OwnershipRecord;

use crate::error::{CreateFailure, DestroyFailure, EngineError};
use crate::handlers::{effective_namespace, NamespaceHandler, NamespaceLifecycle};
use crate::identity::{ResourceName, VnfIdentity};
use crate::manifest::Manifest;
use crate::package::PackageStore;
use crate::registry::HandlerRegistry;

/// A successfully instantiated VNF: the external id handed to the caller
/// and the record of every resource created for it.
#[derive(Debug, Clone)]
pub struct CreatedVnf {
    pub external_id: String,
    pub resources: OwnershipRecord,
}

pub struct VnfOrchestrator {
    registry: HandlerRegistry,
    namespaces: Arc<dyn NamespaceLifecycle>,
    packages: Arc<dyn PackageStore>,
}

impl VnfOrchestrator {
    pub fn new(
        registry: HandlerRegistry,
        namespaces: Arc<dyn NamespaceLifecycle>,
        packages: Arc<dyn PackageStore>,
    ) -> Self {
        Self {
            registry,
            namespaces,
            packages,
        }
    }

    /// The standard wiring: kube-backed handlers and namespace lifecycle
    /// over one cluster client.
    pub fn kubernetes(client: Client, packages: Arc<dyn PackageStore>) -> Self {
        Self::new(
            HandlerRegistry::kubernetes(client.clone()),
            Arc::new(NamespaceHandler::new(client)),
            packages,
        )
    }

    /// Instantiate the package `csar_id` into `namespace`, creating every
    /// resource its manifest names, in manifest order.
    ///
    /// On failure the partial record of already created resources is
    /// returned inside the error; nothing is rolled back.
    pub async fn create_vnf(
        &self,
        csar_id: &str,
        cloud_region_id: &str,
        namespace: &str,
        cancel: &CancellationToken,
    ) -> Result<CreatedVnf, CreateFailure> {
        let namespace = effective_namespace(namespace);
        let mut resources = OwnershipRecord::new();

        match self
            .create_vnf_inner(csar_id, cloud_region_id, namespace, cancel, &mut resources)
            .await
        {
            Ok(external_id) => {
                tracing::info!(
                    vnf_id = %external_id,
                    csar_id,
                    namespace,
                    resource_count = resources.len(),
                    "VNF instantiated"
                );
                Ok(CreatedVnf {
                    external_id,
                    resources,
                })
            }
            Err(error) => {
                tracing::warn!(
                    csar_id,
                    namespace,
                    created_before_failure = resources.len(),
                    %error,
                    "VNF instantiation failed"
                );
                Err(CreateFailure {
                    error,
                    partial: resources,
                })
            }
        }
    }

    async fn create_vnf_inner(
        &self,
        csar_id: &str,
        cloud_region_id: &str,
        namespace: &str,
        cancel: &CancellationToken,
        resources: &mut OwnershipRecord,
    ) -> Result<String, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        if !self.namespaces.exists(namespace).await? {
            self.namespaces.ensure(namespace).await?;
        }

        let identity = VnfIdentity::mint(cloud_region_id, namespace)?;
        let internal_id = identity.internal_id();

        // A package without a manifest instantiates to zero resources.
        let manifest = match self.packages.manifest(csar_id).await? {
            Some(bytes) => Manifest::parse(csar_id, &bytes)?,
            None => Manifest::empty(),
        };

        for entry in &manifest.entries {
            let handler = self.registry.lookup(&entry.resource_type)?;

            for definition_ref in &entry.definitions {
                if cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }

                let definition = self
                    .packages
                    .definition(csar_id, definition_ref)
                    .await?
                    .ok_or_else(|| EngineError::DefinitionMissing {
                        csar_id: csar_id.to_string(),
                        path: definition_ref.to_string(),
                    })?;

                tracing::info!(
                    resource_type = %entry.resource_type,
                    definition = %definition_ref,
                    "processing definition"
                );

                let internal_name = handler.create(&definition, namespace, &internal_id).await?;
                resources.record(&entry.resource_type, internal_name);
            }
        }

        Ok(identity.external_id)
    }

    /// Tear down every resource recorded for one VNF instance.
    ///
    /// Within a type the recorded order is honored. The first failing
    /// delete aborts the call; the error carries the remaining record
    /// (the failing name included) so the caller can retry teardown.
    pub async fn destroy_vnf(
        &self,
        record: &OwnershipRecord,
        namespace: &str,
        cancel: &CancellationToken,
    ) -> Result<(), DestroyFailure> {
        let namespace = effective_namespace(namespace);
        let mut remaining = record.clone();

        for (resource_type, names) in record.iter() {
            let handler = match self.registry.lookup(resource_type) {
                Ok(handler) => handler,
                Err(error) => return Err(DestroyFailure { error, remaining }),
            };

            for name in names {
                if cancel.is_cancelled() {
                    return Err(DestroyFailure {
                        error: EngineError::Cancelled,
                        remaining,
                    });
                }

                tracing::info!(resource_type, name = %name, namespace, "deleting resource");

                if let Err(error) = handler.delete(name, namespace).await {
                    return Err(DestroyFailure { error, remaining });
                }
                remaining.remove(resource_type, name);
            }
        }

        Ok(())
    }

    /// External ids of VNF instances visible in a namespace, recovered
    /// from the names of the deployments they own.
    pub async fn list_vnfs(&self, namespace: &str, limit: u32) -> Result<Vec<String>, EngineError> {
        let handler = self.registry.lookup("deployment")?;
        let names = handler.list(effective_namespace(namespace), limit).await?;

        let mut vnf_ids: Vec<String> = Vec::new();
        for name in names {
            // Skip resources this orchestrator does not own.
            if let Ok(parsed) = ResourceName::parse(&name) {
                if !vnf_ids.contains(&parsed.external_id) {
                    vnf_ids.push(parsed.external_id);
                }
            }
        }

        Ok(vnf_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::handlers::ResourceHandler;

    /// Records every handler call in a log shared across handlers so tests
    /// can assert global ordering. Definitions are the declared resource
    /// name in plain bytes.
    struct RecordingHandler {
        resource_type: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        live: Arc<Mutex<Vec<String>>>,
        fail_delete_on: Option<String>,
    }

    impl RecordingHandler {
        fn new(resource_type: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                resource_type,
                log,
                live: Arc::new(Mutex::new(Vec::new())),
                fail_delete_on: None,
            }
        }
    }

    #[async_trait]
    impl ResourceHandler for RecordingHandler {
        fn resource_type(&self) -> &str {
            self.resource_type
        }

        async fn create(
            &self,
            definition: &[u8],
            _namespace: &str,
            owner_id: &str,
        ) -> Result<String, EngineError> {
            let declared = String::from_utf8(definition.to_vec()).unwrap();
            let name = format!("{owner_id}-{}", declared.trim());
            self.log
                .lock()
                .unwrap()
                .push(format!("create {} {name}", self.resource_type));
            self.live.lock().unwrap().push(name.clone());
            Ok(name)
        }

        async fn delete(&self, name: &str, namespace: &str) -> Result<(), EngineError> {
            if self.fail_delete_on.as_deref() == Some(name) {
                return Err(EngineError::ResourceNotFound {
                    kind: self.resource_type.to_string(),
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                });
            }
            self.log
                .lock()
                .unwrap()
                .push(format!("delete {} {name}", self.resource_type));
            self.live.lock().unwrap().retain(|n| n != name);
            Ok(())
        }

        async fn get(&self, name: &str, _namespace: &str) -> Result<bool, EngineError> {
            Ok(self.live.lock().unwrap().iter().any(|n| n == name))
        }

        async fn list(&self, _namespace: &str, limit: u32) -> Result<Vec<String>, EngineError> {
            let live = self.live.lock().unwrap();
            Ok(live.iter().take(limit as usize).cloned().collect())
        }
    }

    #[derive(Default)]
    struct FakeNamespaces {
        existing: Mutex<Vec<String>>,
        ensured: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NamespaceLifecycle for FakeNamespaces {
        async fn exists(&self, namespace: &str) -> Result<bool, EngineError> {
            Ok(self.existing.lock().unwrap().iter().any(|n| n == namespace))
        }

        async fn ensure(&self, namespace: &str) -> Result<(), EngineError> {
            self.ensured.lock().unwrap().push(namespace.to_string());
            self.existing.lock().unwrap().push(namespace.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemoryPackages {
        manifests: HashMap<String, Vec<u8>>,
        definitions: HashMap<(String, String), Vec<u8>>,
    }

    impl InMemoryPackages {
        fn with_manifest(mut self, csar_id: &str, yaml: &str) -> Self {
            self.manifests.insert(csar_id.to_string(), yaml.into());
            self
        }

        fn with_definition(mut self, csar_id: &str, path: &str, body: &str) -> Self {
            self.definitions
                .insert((csar_id.to_string(), path.to_string()), body.into());
            self
        }
    }

    #[async_trait]
    impl PackageStore for InMemoryPackages {
        async fn manifest(&self, csar_id: &str) -> Result<Option<Vec<u8>>, EngineError> {
            Ok(self.manifests.get(csar_id).cloned())
        }

        async fn definition(
            &self,
            csar_id: &str,
            path: &str,
        ) -> Result<Option<Vec<u8>>, EngineError> {
            Ok(self
                .definitions
                .get(&(csar_id.to_string(), path.to_string()))
                .cloned())
        }
    }

    struct Fixture {
        orchestrator: VnfOrchestrator,
        log: Arc<Mutex<Vec<String>>>,
        namespaces: Arc<FakeNamespaces>,
    }

    fn fixture(packages: InMemoryPackages) -> Fixture {
        fixture_with(packages, None)
    }

    fn fixture_with(packages: InMemoryPackages, fail_delete_on: Option<&str>) -> Fixture {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut deployments = RecordingHandler::new("deployment", log.clone());
        deployments.fail_delete_on = fail_delete_on.map(str::to_string);
        let services = RecordingHandler::new("service", log.clone());

        let registry = HandlerRegistry::new()
            .register(Arc::new(deployments))
            .register(Arc::new(services));
        let namespaces = Arc::new(FakeNamespaces::default());

        Fixture {
            orchestrator: VnfOrchestrator::new(registry, namespaces.clone(), Arc::new(packages)),
            log,
            namespaces,
        }
    }

    fn standard_package() -> InMemoryPackages {
        InMemoryPackages::default()
            .with_manifest(
                "pkgA",
                "resources:\n  - deployment:\n      - deploy.yaml\n  - service:\n      - svc.yaml\n",
            )
            .with_definition("pkgA", "deploy.yaml", "mydeploy")
            .with_definition("pkgA", "svc.yaml", "mysvc")
    }

    #[tokio::test]
    async fn test_create_names_resources_after_identity() {
        let fx = fixture(standard_package());
        let cancel = CancellationToken::new();

        let created = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.external_id).is_ok());
        let prefix = format!("cloud1-tenantA-{}", created.external_id);
        assert_eq!(
            created.resources.names_for("deployment").unwrap(),
            &[format!("{prefix}-mydeploy")]
        );
        assert_eq!(
            created.resources.names_for("service").unwrap(),
            &[format!("{prefix}-mysvc")]
        );
        assert_eq!(fx.namespaces.ensured.lock().unwrap().as_slice(), ["tenantA"]);
    }

    #[tokio::test]
    async fn test_create_preserves_manifest_order() {
        let packages = InMemoryPackages::default()
            .with_manifest(
                "pkgA",
                "resources:\n  - deployment:\n      - a1.yaml\n      - a2.yaml\n  - service:\n      - b1.yaml\n",
            )
            .with_definition("pkgA", "a1.yaml", "a1")
            .with_definition("pkgA", "a2.yaml", "a2")
            .with_definition("pkgA", "b1.yaml", "b1");
        let fx = fixture(packages);
        let cancel = CancellationToken::new();

        let created = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();

        let log = fx.log.lock().unwrap();
        let prefix = format!("cloud1-tenantA-{}", created.external_id);
        assert_eq!(
            log.as_slice(),
            [
                format!("create deployment {prefix}-a1"),
                format!("create deployment {prefix}-a2"),
                format!("create service {prefix}-b1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_with_missing_manifest_succeeds_empty() {
        let fx = fixture(InMemoryPackages::default());
        let cancel = CancellationToken::new();

        let created = fx
            .orchestrator
            .create_vnf("nosuchpkg", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.external_id).is_ok());
        assert!(created.resources.is_empty());
    }

    #[tokio::test]
    async fn test_create_missing_handler_aborts_with_partial() {
        let packages = InMemoryPackages::default()
            .with_manifest(
                "pkgA",
                "resources:\n  - deployment:\n      - deploy.yaml\n  - statefulset:\n      - sts.yaml\n",
            )
            .with_definition("pkgA", "deploy.yaml", "mydeploy")
            .with_definition("pkgA", "sts.yaml", "mysts");
        let fx = fixture(packages);
        let cancel = CancellationToken::new();

        let failure = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(
            matches!(&failure.error, EngineError::HandlerNotFound(t) if t == "statefulset")
        );
        // The deployment created before the failing entry stays recorded.
        assert_eq!(failure.partial.len(), 1);
        assert!(failure.partial.names_for("deployment").is_some());
    }

    #[tokio::test]
    async fn test_create_missing_definition_aborts_with_partial() {
        let packages = InMemoryPackages::default()
            .with_manifest(
                "pkgA",
                "resources:\n  - deployment:\n      - deploy.yaml\n  - service:\n      - svc.yaml\n",
            )
            .with_definition("pkgA", "deploy.yaml", "mydeploy");
        let fx = fixture(packages);
        let cancel = CancellationToken::new();

        let failure = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            &failure.error,
            EngineError::DefinitionMissing { path, .. } if path == "svc.yaml"
        ));
        assert_eq!(failure.partial.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_region() {
        let fx = fixture(standard_package());
        let cancel = CancellationToken::new();

        let failure = fx
            .orchestrator
            .create_vnf("pkgA", "cloud-1", "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, EngineError::InvalidIdentifier(_)));
        assert!(failure.partial.is_empty());
    }

    #[tokio::test]
    async fn test_create_cancelled_before_start() {
        let fx = fixture(standard_package());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, EngineError::Cancelled));
        assert!(failure.partial.is_empty());
    }

    #[tokio::test]
    async fn test_destroy_deletes_everything_created() {
        let fx = fixture(standard_package());
        let cancel = CancellationToken::new();

        let created = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();

        fx.orchestrator
            .destroy_vnf(&created.resources, "tenantA", &cancel)
            .await
            .unwrap();

        // Every recorded resource is gone.
        for (resource_type, names) in created.resources.iter() {
            let handler = fx.orchestrator.registry.lookup(resource_type).unwrap();
            for name in names {
                assert!(!handler.get(name, "tenantA").await.unwrap());
            }
        }
    }

    #[tokio::test]
    async fn test_destroy_stops_at_first_failure_with_remaining() {
        let packages = InMemoryPackages::default()
            .with_manifest(
                "pkgA",
                "resources:\n  - deployment:\n      - a1.yaml\n      - a2.yaml\n",
            )
            .with_definition("pkgA", "a1.yaml", "a1")
            .with_definition("pkgA", "a2.yaml", "a2");

        // Build once to learn the minted names, then rebuild with the
        // second deployment's delete rigged to fail.
        let fx = fixture(packages);
        let cancel = CancellationToken::new();
        let created = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();
        let names = created.resources.names_for("deployment").unwrap().to_vec();

        let fx = fixture_with(InMemoryPackages::default(), Some(names[1].as_str()));
        let failure = fx
            .orchestrator
            .destroy_vnf(&created.resources, "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(failure.error.is_not_found());
        assert_eq!(
            failure.remaining.names_for("deployment").unwrap(),
            &names[1..]
        );
    }

    #[tokio::test]
    async fn test_destroy_missing_handler_keeps_record() {
        let fx = fixture(InMemoryPackages::default());
        let cancel = CancellationToken::new();

        let mut record = OwnershipRecord::new();
        record.record("statefulset", "cloud1-tenantA-x-sts");

        let failure = fx
            .orchestrator
            .destroy_vnf(&record, "tenantA", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, EngineError::HandlerNotFound(_)));
        assert_eq!(failure.remaining, record);
    }

    #[tokio::test]
    async fn test_list_recovers_external_ids() {
        let fx = fixture(standard_package());
        let cancel = CancellationToken::new();

        let created = fx
            .orchestrator
            .create_vnf("pkgA", "cloud1", "tenantA", &cancel)
            .await
            .unwrap();

        let vnf_ids = fx.orchestrator.list_vnfs("tenantA", 10).await.unwrap();
        assert_eq!(vnf_ids, vec![created.external_id]);
    }
}
