//! `serve` command: wire the orchestrator to the HTTP surface.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use kubevnf_engine::{get_kube_client, CsarDirectory, VnfOrchestrator};

use crate::api::{self, AppState};
use crate::config::Config;

pub async fn run_serve(port: Option<u16>) -> Result<()> {
    let config = Config::load()?;
    let port = port.unwrap_or(config.server_port);

    tracing::info!(csar_dir = %config.csar_dir.display(), "starting KubeVNF API");

    let client = get_kube_client().await?;
    let packages = Arc::new(CsarDirectory::new(config.csar_dir.clone()));
    let orchestrator = Arc::new(VnfOrchestrator::kubernetes(client, packages));

    let host = config.server_host.clone();
    let state = AppState {
        orchestrator,
        config: Arc::new(config),
        instances: Arc::new(RwLock::new(HashMap::new())),
    };

    api::start_server(&host, port, state).await
}
