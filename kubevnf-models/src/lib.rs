use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mapping from resource type to the internal names created for one VNF
/// instance, in creation order.
///
/// This record is the only durable linkage between instantiation and
/// teardown: the orchestrator hands it to the caller after `create_vnf`
/// and consumes it wholesale in `destroy_vnf`. It serializes to a flat
/// JSON object of string -> string-array, e.g.
///
/// ```json
/// {"deployment": ["cloud1-default-e1-mydeploy"], "service": ["cloud1-default-e1-mysvc"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipRecord(BTreeMap<String, Vec<String>>);

impl OwnershipRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an internal resource name under a resource type, preserving
    /// insertion order within the type.
    pub fn record(&mut self, resource_type: &str, internal_name: impl Into<String>) {
        self.0
            .entry(resource_type.to_string())
            .or_default()
            .push(internal_name.into());
    }

    /// Remove the first occurrence of an internal name under a resource
    /// type, dropping the type key once its list is empty. Used to track
    /// the remaining record during teardown.
    pub fn remove(&mut self, resource_type: &str, internal_name: &str) {
        if let Some(names) = self.0.get_mut(resource_type) {
            if let Some(idx) = names.iter().position(|n| n == internal_name) {
                names.remove(idx);
            }
            if names.is_empty() {
                self.0.remove(resource_type);
            }
        }
    }

    pub fn names_for(&self, resource_type: &str) -> Option<&[String]> {
        self.0.get(resource_type).map(|v| v.as_slice())
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of recorded resource names across all types.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// Request body for `POST /v1/vnf_instances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVnfRequest {
    /// Package (CSAR) identifier naming the resource-definition directory.
    pub csar_id: String,
    pub cloud_region_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Response body for `POST /v1/vnf_instances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVnfResponse {
    /// Externally visible VNF identifier.
    pub vnf_id: String,
    pub namespace: String,
    pub resources: OwnershipRecord,
}

/// Response body for `GET /v1/vnf_instances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListVnfResponse {
    pub vnf_ids: Vec<String>,
}

/// Response body for `DELETE /v1/vnf_instances/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVnfResponse {
    pub vnf_id: String,
    pub deleted: bool,
}

/// A VNF instance as tracked by the server between create and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnfInstance {
    pub vnf_id: String,
    pub csar_id: String,
    pub cloud_region_id: String,
    pub namespace: String,
    pub resources: OwnershipRecord,
    pub created_at: DateTime<Utc>,
}
