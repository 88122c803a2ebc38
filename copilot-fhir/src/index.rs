//! Patient index: the selectable patients of a loaded bundle.

use copilot_core::{Bundle, CopilotError, PatientEntry};

use crate::{patient_name, resource_type, text_at};

const MISSING: &str = "?";

/// One entry per Patient resource, in bundle order.
pub fn patient_index(bundle: &Bundle) -> Vec<PatientEntry<'_>> {
    bundle
        .resources()
        .filter(|resource| resource_type(resource) == Some("Patient"))
        .map(|resource| {
            let name = patient_name(resource).unwrap_or("Unknown");
            let gender = text_at(resource, &["gender"]).unwrap_or(MISSING);
            let birth_date = text_at(resource, &["birthDate"]).unwrap_or(MISSING);
            PatientEntry {
                id: text_at(resource, &["id"]).unwrap_or(MISSING).to_string(),
                label: format!("{name} ({gender}, {birth_date})"),
                resource,
            }
        })
        .collect()
}

/// Like [`patient_index`], but an empty index is the terminal "no data" condition.
pub fn require_patients(bundle: &Bundle) -> Result<Vec<PatientEntry<'_>>, CopilotError> {
    let patients = patient_index(bundle);
    if patients.is_empty() {
        return Err(CopilotError::NoPatients);
    }
    Ok(patients)
}

pub fn find_patient<'a>(bundle: &'a Bundle, patient_id: &str) -> Result<PatientEntry<'a>, CopilotError> {
    patient_index(bundle)
        .into_iter()
        .find(|patient| patient.id == patient_id)
        .ok_or_else(|| CopilotError::UnknownPatient(patient_id.to_string()))
}
