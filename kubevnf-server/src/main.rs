use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod config;

use cli::{Args, Mode};

fn initialize_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,kubevnf_server=debug,kubevnf_engine=debug".into()
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    initialize_tracing();

    match args.mode {
        Mode::Serve { port } => commands::server::run_serve(port).await,
        Mode::Create {
            csar_id,
            cloud_region,
            namespace,
            output,
        } => commands::instance::run_create(csar_id, cloud_region, namespace, output).await,
        Mode::Delete { record, namespace } => {
            commands::instance::run_delete(record, namespace).await
        }
        Mode::List { namespace, limit } => commands::instance::run_list(namespace, limit).await,
    }
}
