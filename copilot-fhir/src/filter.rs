//! Patient filter: one patient's own resource plus everything that names it as subject.

use copilot_core::{Bundle, CLINICAL_RESOURCE_TYPES};
use serde_json::Value;

use crate::{resource_type, text_at};

/// Selects the resources belonging to a patient.
///
/// The default allow-list is [`CLINICAL_RESOURCE_TYPES`]; resource types outside
/// the list are never included, whatever their subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFilter {
    allowed_types: Vec<String>,
}

impl Default for PatientFilter {
    fn default() -> Self {
        Self::with_types(CLINICAL_RESOURCE_TYPES)
    }
}

impl PatientFilter {
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, resource_type: &str) -> bool {
        self.allowed_types.iter().any(|allowed| allowed == resource_type)
    }

    /// Build a new `collection` bundle for `patient_id`. `bundle` is left untouched.
    pub fn apply(&self, bundle: &Bundle, patient_id: &str) -> Bundle {
        let mut filtered = Bundle::collection();
        let mut patient_taken = false;

        for entry in &bundle.entries {
            let Some(kind) = resource_type(&entry.resource) else {
                continue;
            };

            let keep = if kind == "Patient" {
                !patient_taken && entry.resource_id() == Some(patient_id)
            } else {
                self.allows(kind) && references_patient(&entry.resource, patient_id)
            };

            if keep {
                patient_taken |= kind == "Patient";
                filtered.push(entry.clone());
            }
        }

        filtered
    }
}

/// Filter with the default allow-list.
pub fn filter_for_patient(bundle: &Bundle, patient_id: &str) -> Bundle {
    PatientFilter::default().apply(bundle, patient_id)
}

/// True when `subject.reference` ends with `Patient/<patient_id>`.
///
/// A missing or non-string reference never matches.
pub fn references_patient(resource: &Value, patient_id: &str) -> bool {
    text_at(resource, &["subject", "reference"])
        .is_some_and(|reference| reference.ends_with(&format!("Patient/{patient_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::BundleEntry;
    use serde_json::json;

    fn bundle_of(resources: Vec<Value>) -> Bundle {
        resources.into_iter().map(BundleEntry::new).collect()
    }

    fn condition(id: &str, reference: &str) -> Value {
        json!({
            "resourceType": "Condition",
            "id": id,
            "subject": {"reference": reference}
        })
    }

    #[test]
    fn keeps_patient_and_its_own_resources() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Patient", "id": "p1"}),
            condition("c1", "Patient/p1"),
            condition("c2", "Patient/p2"),
        ]);

        let filtered = filter_for_patient(&bundle, "p1");

        let ids: Vec<_> = filtered.entries.iter().filter_map(|e| e.resource_id()).collect();
        assert_eq!(ids, ["p1", "c1"]);
        assert_eq!(filtered.bundle_type, "collection");
    }

    #[test]
    fn malformed_subjects_are_excluded() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Observation", "id": "o1"}),
            json!({"resourceType": "Observation", "id": "o2", "subject": "Patient/p1"}),
            json!({"resourceType": "Observation", "id": "o3", "subject": {"reference": 42}}),
            json!({"resourceType": "Observation", "id": "o4", "subject": {"reference": "https://fhir.example/Patient/p1"}}),
        ]);

        let filtered = filter_for_patient(&bundle, "p1");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.entries[0].resource_id(), Some("o4"));
    }

    #[test]
    fn types_outside_allow_list_are_excluded() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "DiagnosticReport", "id": "d1", "subject": {"reference": "Patient/p1"}}),
            json!({"resourceType": "Encounter", "id": "e1", "subject": {"reference": "Patient/p1"}}),
        ]);

        let filtered = filter_for_patient(&bundle, "p1");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.entries[0].resource_id(), Some("e1"));

        let widened = PatientFilter::with_types(["DiagnosticReport"]).apply(&bundle, "p1");
        assert_eq!(widened.len(), 1);
        assert_eq!(widened.entries[0].resource_id(), Some("d1"));
    }

    #[test]
    fn only_one_patient_resource_is_kept() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Patient", "id": "p1", "name": [{"text": "first"}]}),
            json!({"resourceType": "Patient", "id": "p2"}),
            json!({"resourceType": "Patient", "id": "p1", "name": [{"text": "copy"}]}),
        ]);

        let filtered = filter_for_patient(&bundle, "p1");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.entries[0].resource["name"][0]["text"], "first");
    }

    #[test]
    fn every_kept_entry_belongs_to_the_patient() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Patient", "id": "p1"}),
            json!({"resourceType": "Patient", "id": "p11"}),
            condition("c1", "Patient/p1"),
            condition("c2", "Patient/p11"),
            json!({"resourceType": "MedicationRequest", "id": "m1", "subject": {"reference": "Patient/p1"}}),
            json!({"resourceType": "Immunization", "id": "i1", "subject": {}}),
        ]);

        let filtered = filter_for_patient(&bundle, "p1");

        assert_eq!(filtered.len(), 3);
        for entry in &filtered.entries {
            let own_patient =
                entry.resource_type() == Some("Patient") && entry.resource_id() == Some("p1");
            assert!(own_patient || references_patient(&entry.resource, "p1"));
        }
    }

    #[test]
    fn input_bundle_is_not_modified() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Patient", "id": "p1"}),
            condition("c2", "Patient/p2"),
        ]);
        let before = bundle.clone();

        let _ = filter_for_patient(&bundle, "p1");

        assert_eq!(bundle, before);
    }
}
