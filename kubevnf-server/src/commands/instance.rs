//! Direct instance commands: create, delete and list without going
//! through the HTTP surface. `create` prints the ownership record; that
//! record is the only handle needed to delete the instance later.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use kubevnf_engine::{get_kube_client, CsarDirectory, VnfOrchestrator};
use kubevnf_models::OwnershipRecord;

use crate::config::Config;

async fn build_orchestrator(config: &Config) -> Result<VnfOrchestrator> {
    let client = get_kube_client().await?;
    let packages = Arc::new(CsarDirectory::new(config.csar_dir.clone()));
    Ok(VnfOrchestrator::kubernetes(client, packages))
}

pub async fn run_create(
    csar_id: String,
    cloud_region: Option<String>,
    namespace: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let cloud_region = cloud_region.unwrap_or_else(|| config.cloud_region.clone());
    let namespace = namespace.unwrap_or_else(|| config.namespace.clone());

    let orchestrator = build_orchestrator(&config).await?;
    let created = orchestrator
        .create_vnf(&csar_id, &cloud_region, &namespace, &CancellationToken::new())
        .await
        .map_err(|failure| {
            anyhow::anyhow!(
                "instantiation failed after creating {} resource(s): {}",
                failure.partial.len(),
                failure.error
            )
        })?;

    let record_json = created.resources.to_json()?;
    println!("vnf_id: {}", created.external_id);
    match output {
        Some(path) => {
            std::fs::write(&path, &record_json)
                .with_context(|| format!("Failed to write record to {}", path.display()))?;
            println!("record written to {}", path.display());
        }
        None => println!("{record_json}"),
    }

    Ok(())
}

pub async fn run_delete(record_path: PathBuf, namespace: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let namespace = namespace.unwrap_or_else(|| config.namespace.clone());

    let data = std::fs::read_to_string(&record_path)
        .with_context(|| format!("Failed to read record {}", record_path.display()))?;
    let record = OwnershipRecord::from_json(&data).context("Malformed ownership record")?;

    let orchestrator = build_orchestrator(&config).await?;
    match orchestrator
        .destroy_vnf(&record, &namespace, &CancellationToken::new())
        .await
    {
        Ok(()) => {
            println!("deleted {} resource(s)", record.len());
            Ok(())
        }
        Err(failure) => {
            // Rewrite the record so a later run resumes where this one stopped.
            std::fs::write(&record_path, failure.remaining.to_json()?).with_context(|| {
                format!("Failed to rewrite record {}", record_path.display())
            })?;
            anyhow::bail!(
                "teardown stopped with {} resource(s) remaining: {}",
                failure.remaining.len(),
                failure.error
            )
        }
    }
}

pub async fn run_list(namespace: Option<String>, limit: u32) -> Result<()> {
    let config = Config::load()?;
    let namespace = namespace.unwrap_or_else(|| config.namespace.clone());

    let orchestrator = build_orchestrator(&config).await?;
    let vnf_ids = orchestrator.list_vnfs(&namespace, limit).await?;

    if vnf_ids.is_empty() {
        println!("no VNF instances in namespace {namespace}");
    } else {
        for id in vnf_ids {
            println!("{id}");
        }
    }

    Ok(())
}
