//! Package storage: resolving manifest and definition references to raw
//! bytes.
//!
//! The orchestrator never reads package storage directly; it asks a
//! `PackageStore` for bytes given a reference. A missing manifest is `None`
//! (the VNF is created with zero resources), a missing definition is also
//! `None` and the orchestrator turns it into a hard error.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::EngineError;

/// File name of the ordered resource manifest inside a package.
pub const MANIFEST_FILE: &str = "sequence.yaml";

#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Raw bytes of the package manifest, or `None` if the package has no
    /// manifest.
    async fn manifest(&self, csar_id: &str) -> Result<Option<Vec<u8>>, EngineError>;

    /// Raw bytes of one resource definition, or `None` if the reference
    /// does not resolve.
    async fn definition(&self, csar_id: &str, path: &str) -> Result<Option<Vec<u8>>, EngineError>;
}

/// Filesystem-backed package store: one directory per CSAR id under a
/// configured root, definitions addressed by relative path.
#[derive(Debug, Clone)]
pub struct CsarDirectory {
    root: PathBuf,
}

impl CsarDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(&self, csar_id: &str, path: &str) -> Result<Option<Vec<u8>>, EngineError> {
        let full = self.root.join(csar_id).join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(EngineError::PackageStore {
                csar_id: csar_id.to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl PackageStore for CsarDirectory {
    async fn manifest(&self, csar_id: &str) -> Result<Option<Vec<u8>>, EngineError> {
        self.read(csar_id, MANIFEST_FILE).await
    }

    async fn definition(&self, csar_id: &str, path: &str) -> Result<Option<Vec<u8>>, EngineError> {
        self.read(csar_id, path).await
    }
}
