//! Shared Kubernetes client construction.

use anyhow::{Context, Result};
use kube::Client;

/// Build a client from the ambient kubeconfig or in-cluster environment.
pub async fn get_kube_client() -> Result<Client> {
    Client::try_default()
        .await
        .context("Failed to create Kubernetes client")
}
