//! Package manifest: the ordered description of which resource definitions
//! to apply and in what order.
//!
//! The manifest is a `sequence.yaml` at the root of the package directory:
//!
//! ```yaml
//! resources:
//!   - deployment:
//!       - deployment.yaml
//!       - deployment-db.yaml
//!   - service:
//!       - service.yaml
//! ```
//!
//! The outer list is the creation order and is respected exactly; there is
//! no reordering by type and no parallelism.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::EngineError;

/// One manifest step: a resource type and the definition files to apply
/// for it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub resource_type: String,
    pub definitions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    resources: Vec<BTreeMap<String, Vec<String>>>,
}

impl Manifest {
    /// An empty manifest; instantiating a VNF with zero resources is a
    /// legal degenerate case.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse manifest bytes. Malformed YAML is a hard error.
    pub fn parse(csar_id: &str, data: &[u8]) -> Result<Self, EngineError> {
        let raw: RawManifest =
            serde_yaml::from_slice(data).map_err(|source| EngineError::Manifest {
                csar_id: csar_id.to_string(),
                source,
            })?;

        let mut entries = Vec::new();
        for step in raw.resources {
            for (resource_type, definitions) in step {
                entries.push(ManifestEntry {
                    resource_type,
                    definitions,
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_entry_order() {
        let yaml = b"resources:\n  - deployment:\n      - deploy1.yaml\n      - deploy2.yaml\n  - service:\n      - svc.yaml\n";
        let manifest = Manifest::parse("pkgA", yaml).unwrap();

        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].resource_type, "deployment");
        assert_eq!(
            manifest.entries[0].definitions,
            vec!["deploy1.yaml", "deploy2.yaml"]
        );
        assert_eq!(manifest.entries[1].resource_type, "service");
        assert_eq!(manifest.entries[1].definitions, vec!["svc.yaml"]);
    }

    #[test]
    fn test_parse_service_before_deployment() {
        // Order comes from the list, not from the type names.
        let yaml = b"resources:\n  - service:\n      - svc.yaml\n  - deployment:\n      - deploy.yaml\n";
        let manifest = Manifest::parse("pkgA", yaml).unwrap();

        assert_eq!(manifest.entries[0].resource_type, "service");
        assert_eq!(manifest.entries[1].resource_type, "deployment");
    }

    #[test]
    fn test_parse_empty_resources() {
        let manifest = Manifest::parse("pkgA", b"resources: []\n").unwrap();
        assert!(manifest.is_empty());

        let manifest = Manifest::parse("pkgA", b"{}\n").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_parse_malformed_is_hard_error() {
        let err = Manifest::parse("pkgA", b"resources: {not: [a, list\n").unwrap_err();
        assert!(matches!(err, EngineError::Manifest { .. }));

        // Wrong shape under the key is also malformed.
        let err = Manifest::parse("pkgA", b"resources:\n  - deployment: 42\n").unwrap_err();
        assert!(matches!(err, EngineError::Manifest { .. }));
    }
}
