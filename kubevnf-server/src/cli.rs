use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// KubeVNF - VNF instantiation on Kubernetes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Run the HTTP API server
    Serve {
        /// API port (overrides SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Instantiate a VNF from a package
    Create {
        /// CSAR package id (directory name under CSAR_DIR)
        csar_id: String,

        /// Cloud region id (overrides CLOUD_REGION)
        #[arg(long)]
        cloud_region: Option<String>,

        /// Target namespace (overrides VNF_NAMESPACE)
        #[arg(long)]
        namespace: Option<String>,

        /// Write the ownership record to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Tear down a VNF from its ownership record
    Delete {
        /// Path to the ownership record JSON written by `create`
        record: PathBuf,

        /// Namespace the instance was created in (overrides VNF_NAMESPACE)
        #[arg(long)]
        namespace: Option<String>,
    },

    /// List VNF instance ids visible in a namespace
    List {
        /// Namespace to list (overrides VNF_NAMESPACE)
        #[arg(long)]
        namespace: Option<String>,

        /// Maximum number of underlying resources to scan
        #[arg(short, long, default_value = "100")]
        limit: u32,
    },
}
