//! Handler registry: resource-type name to handler.
//!
//! Built once at process start and passed to the orchestrator; never
//! mutated afterwards, so concurrent lookups need no locking. A lookup
//! miss is a configuration error that aborts the whole orchestration call.

use std::collections::HashMap;
use std::sync::Arc;

use kube::Client;

use crate::error::EngineError;
use crate::handlers::{DeploymentHandler, NamespaceHandler, ResourceHandler, ServiceHandler};

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own resource-type name. Last
    /// registration wins.
    pub fn register(mut self, handler: Arc<dyn ResourceHandler>) -> Self {
        self.handlers
            .insert(handler.resource_type().to_string(), handler);
        self
    }

    pub fn lookup(&self, resource_type: &str) -> Result<Arc<dyn ResourceHandler>, EngineError> {
        self.handlers
            .get(resource_type)
            .cloned()
            .ok_or_else(|| EngineError::HandlerNotFound(resource_type.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }

    /// The standard registry: deployment, service and namespace handlers
    /// over one cluster client.
    pub fn kubernetes(client: Client) -> Self {
        Self::new()
            .register(Arc::new(DeploymentHandler::new(client.clone(), "deployment")))
            .register(Arc::new(ServiceHandler::new(client.clone(), "service")))
            .register(Arc::new(NamespaceHandler::new(client)))
    }
}
