//! Shared domain types for the clinical copilot: resources, bundles and patient entries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single clinical record, kept as the raw FHIR JSON object it was read from.
pub type Resource = Value;

/// Resource types that may be attached to a patient through `subject.reference`.
pub const CLINICAL_RESOURCE_TYPES: [&str; 7] = [
    "Condition",
    "MedicationRequest",
    "Observation",
    "Procedure",
    "Immunization",
    "AllergyIntolerance",
    "Encounter",
];

/// One slot of a bundle. Fields other than `resource` (e.g. `fullUrl`) are kept as read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleEntry {
    pub resource: Resource,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundleEntry {
    /// Wrap a bare resource in a synthetic entry.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            extra: Map::new(),
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource.get("resourceType").and_then(Value::as_str)
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource.get("id").and_then(Value::as_str)
    }
}

/// Ordered collection of resources. Serializes as a FHIR `collection` bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "type")]
    pub bundle_type: String,
    #[serde(rename = "entry", default)]
    pub entries: Vec<BundleEntry>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self::collection()
    }
}

impl Bundle {
    /// Empty `collection` bundle.
    pub fn collection() -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: "collection".to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: BundleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resources in bundle order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter().map(|entry| &entry.resource)
    }
}

impl FromIterator<BundleEntry> for Bundle {
    fn from_iter<I: IntoIterator<Item = BundleEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            ..Self::collection()
        }
    }
}

/// A selectable patient derived from the loaded records. Recomputed on every load.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientEntry<'a> {
    pub id: String,
    pub label: String,
    #[serde(skip)]
    pub resource: &'a Resource,
}

/// Options for rendering a bundle as summary text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryConfig {
    /// Also render Procedure, Immunization, AllergyIntolerance and Encounter lines.
    #[serde(default)]
    pub extended_templates: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CopilotError {
    #[error("cannot read data directory {}: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No Patient resources found. Check that the data files contain Patient resources.")]
    NoPatients,
    #[error("no Patient resource with id {0}")]
    UnknownPatient(String),
    #[error("cannot parse document: {0}")]
    Parse(String),
}
