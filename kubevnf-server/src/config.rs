use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding one package directory per CSAR id.
    pub csar_dir: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    /// Default cloud region recorded into internal resource names.
    pub cloud_region: String,
    /// Default target namespace when a request does not name one.
    pub namespace: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            csar_dir: std::env::var("CSAR_DIR")
                .context("CSAR_DIR must be set")?
                .into(),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            cloud_region: std::env::var("CLOUD_REGION")
                .unwrap_or_else(|_| "cloud1".to_string()),
            namespace: std::env::var("VNF_NAMESPACE")
                .unwrap_or_else(|_| "default".to_string()),
        })
    }
}
