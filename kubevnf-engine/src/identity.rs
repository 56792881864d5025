//! VNF identifier scheme.
//!
//! A VNF instance has two identities. The external ID is the opaque UUID
//! returned to API callers. The internal ID is the composite
//! `<cloud-region>-<namespace>-<external-id>` embedded into the name of
//! every cluster object the instance owns, so that any resource can be
//! traced back to its VNF by name alone.
//!
//! `-` is the separator, so cloud region and namespace identifiers must not
//! contain it; `mint` rejects values that do. Declared resource names are
//! free to contain `-`: parsing anchors on the fixed-width UUID instead of
//! counting separator segments.

use uuid::Uuid;

use crate::error::EngineError;

pub const SEPARATOR: char = '-';

/// Length of a hyphenated v4 UUID.
const UUID_LEN: usize = 36;

/// The identity of one VNF instance, minted once per `create_vnf` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VnfIdentity {
    pub cloud_region: String,
    pub namespace: String,
    pub external_id: String,
}

impl VnfIdentity {
    /// Generate a fresh identity. Fails if the cloud region or namespace
    /// contains the separator character, which would make resource names
    /// ambiguous.
    pub fn mint(cloud_region: &str, namespace: &str) -> Result<Self, EngineError> {
        validate_component("cloud region", cloud_region)?;
        validate_component("namespace", namespace)?;

        Ok(Self {
            cloud_region: cloud_region.to_string(),
            namespace: namespace.to_string(),
            external_id: Uuid::new_v4().to_string(),
        })
    }

    /// Reconstruct the identity from its components, e.g. when destroying
    /// an instance created in an earlier process.
    pub fn from_parts(
        cloud_region: &str,
        namespace: &str,
        external_id: &str,
    ) -> Result<Self, EngineError> {
        validate_component("cloud region", cloud_region)?;
        validate_component("namespace", namespace)?;
        Uuid::parse_str(external_id).map_err(|_| {
            EngineError::InvalidIdentifier(format!("{external_id:?} is not a valid external id"))
        })?;

        Ok(Self {
            cloud_region: cloud_region.to_string(),
            namespace: namespace.to_string(),
            external_id: external_id.to_string(),
        })
    }

    /// `cloud1-default-<uuid>`
    pub fn internal_id(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.cloud_region, self.namespace, self.external_id
        )
    }

    /// The cluster-visible name for a resource declared as `declared_name`
    /// in the package: `cloud1-default-<uuid>-sisedeploy`.
    pub fn resource_name(&self, declared_name: &str) -> String {
        format!("{}{SEPARATOR}{}", self.internal_id(), declared_name)
    }
}

fn validate_component(what: &str, value: &str) -> Result<(), EngineError> {
    if value.is_empty() {
        return Err(EngineError::InvalidIdentifier(format!("{what} is empty")));
    }
    if value.contains(SEPARATOR) {
        return Err(EngineError::InvalidIdentifier(format!(
            "{what} {value:?} must not contain {SEPARATOR:?}"
        )));
    }
    Ok(())
}

/// A cluster-visible resource name decomposed back into its identity parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName {
    pub cloud_region: String,
    pub namespace: String,
    pub external_id: String,
    pub declared_name: String,
}

impl ResourceName {
    /// Recover the identity embedded in a cluster resource name.
    ///
    /// Layout is `region-namespace-uuid-declared`, where region and
    /// namespace are separator-free and the UUID is exactly 36 characters,
    /// so the declared name is whatever follows regardless of how many
    /// hyphens it contains.
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        let invalid =
            || EngineError::InvalidIdentifier(format!("{name:?} is not a VNF resource name"));

        let (cloud_region, rest) = name.split_once(SEPARATOR).ok_or_else(invalid)?;
        let (namespace, rest) = rest.split_once(SEPARATOR).ok_or_else(invalid)?;

        if cloud_region.is_empty()
            || namespace.is_empty()
            || rest.len() < UUID_LEN + 2
            || !rest.is_char_boundary(UUID_LEN)
        {
            return Err(invalid());
        }

        let (external_id, rest) = rest.split_at(UUID_LEN);
        Uuid::parse_str(external_id).map_err(|_| invalid())?;

        let declared_name = rest.strip_prefix(SEPARATOR).ok_or_else(invalid)?;
        if declared_name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            cloud_region: cloud_region.to_string(),
            namespace: namespace.to_string(),
            external_id: external_id.to_string(),
            declared_name: declared_name.to_string(),
        })
    }
}
