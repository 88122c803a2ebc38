//! Patient-record extraction over FHIR JSON: load a record directory, index its
//! patients, narrow it to one patient and render that patient as summary text.

mod filter;
mod index;
mod loader;
mod summary;

pub use filter::{filter_for_patient, references_patient, PatientFilter};
pub use index::{find_patient, patient_index, require_patients};
pub use loader::{load_directory, load_str, load_value, LoadReport, SkippedFile};
pub use summary::{summarize_bundle, summarize_with};

use copilot_core::{Bundle, SummaryConfig};
use serde_json::Value;

/// Filter `bundle` down to one patient and summarize the result.
pub fn patient_summary(bundle: &Bundle, patient_id: &str, config: &SummaryConfig) -> String {
    let filtered = filter_for_patient(bundle, patient_id);
    summarize_with(&filtered, config)
}

/// Walk nested objects and return a non-empty string at the end of `path`.
pub(crate) fn text_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().filter(|text| !text.is_empty())
}

pub(crate) fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

/// Display name of a Patient: first `name` element's `text`, else its `family`.
pub(crate) fn patient_name(resource: &Value) -> Option<&str> {
    let name = resource.get("name")?.as_array()?.first()?;
    text_at(name, &["text"]).or_else(|| text_at(name, &["family"]))
}
