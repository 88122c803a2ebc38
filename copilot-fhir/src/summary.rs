//! Summarizer: one deterministic text line per recognized resource.
//!
//! The wording is reused verbatim as model prompt context, so changes here
//! change every downstream prompt.

use copilot_core::{Bundle, SummaryConfig};
use serde_json::Value;

use crate::{patient_name, resource_type, text_at};

const UNKNOWN: &str = "Unknown";

/// Summarize with the default template set (Patient, Condition, MedicationRequest, Observation).
pub fn summarize_bundle(bundle: &Bundle) -> String {
    summarize_with(bundle, &SummaryConfig::default())
}

/// Lines in bundle order, joined by `\n` without a trailing newline.
pub fn summarize_with(bundle: &Bundle, config: &SummaryConfig) -> String {
    bundle
        .resources()
        .filter_map(|resource| summary_line(resource, config))
        .collect::<Vec<_>>()
        .join("\n")
}

fn summary_line(resource: &Value, config: &SummaryConfig) -> Option<String> {
    let code_text = |fallback: &'static str| text_at(resource, &["code", "text"]).unwrap_or(fallback);

    match resource_type(resource)? {
        "Patient" => Some(format!(
            "Patient: {}, Gender: {}, DOB: {}",
            patient_name(resource).unwrap_or(UNKNOWN),
            text_at(resource, &["gender"]).unwrap_or(UNKNOWN),
            text_at(resource, &["birthDate"]).unwrap_or(UNKNOWN),
        )),
        "Condition" => Some(format!("Condition: {}", code_text("Unknown condition"))),
        "MedicationRequest" => Some(format!(
            "Medication: {}",
            text_at(resource, &["medicationCodeableConcept", "text"])
                .unwrap_or("Unknown medication")
        )),
        "Observation" => observation_line(resource),
        "Procedure" if config.extended_templates => {
            Some(format!("Procedure: {}", code_text("Unknown procedure")))
        }
        "Immunization" if config.extended_templates => Some(format!(
            "Immunization: {}",
            text_at(resource, &["vaccineCode", "text"]).unwrap_or("Unknown vaccine")
        )),
        "AllergyIntolerance" if config.extended_templates => {
            Some(format!("Allergy: {}", code_text("Unknown allergen")))
        }
        "Encounter" if config.extended_templates => Some(format!(
            "Encounter: {}",
            resource
                .get("type")
                .and_then(Value::as_array)
                .and_then(|types| types.first())
                .and_then(|first| text_at(first, &["text"]))
                .unwrap_or("Unknown encounter")
        )),
        _ => None,
    }
}

/// Needs both `code.text` and `valueQuantity.value`; otherwise no line.
fn observation_line(resource: &Value) -> Option<String> {
    let name = text_at(resource, &["code", "text"])?;
    let quantity = resource.get("valueQuantity")?;
    let value = quantity_value(quantity.get("value")?)?;
    let unit = text_at(quantity, &["unit"]).unwrap_or("");
    Some(format!("Lab/Observation: {name} = {value} {unit}"))
}

/// Zero is a reading, so any JSON number counts as present.
fn quantity_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::BundleEntry;
    use serde_json::json;

    fn bundle_of(resources: Vec<Value>) -> Bundle {
        resources.into_iter().map(BundleEntry::new).collect()
    }

    fn jane() -> Value {
        json!({
            "resourceType": "Patient",
            "id": "p1",
            "name": [{"text": "Jane Doe"}],
            "gender": "female",
            "birthDate": "1980-01-01"
        })
    }

    #[test]
    fn patient_and_condition_lines() {
        let bundle = bundle_of(vec![
            jane(),
            json!({"resourceType": "Condition", "code": {"text": "Hypertension"}}),
        ]);

        assert_eq!(
            summarize_bundle(&bundle),
            "Patient: Jane Doe, Gender: female, DOB: 1980-01-01\nCondition: Hypertension"
        );
    }

    #[test]
    fn incomplete_observation_produces_no_line() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Observation", "code": {"text": "HbA1c"}}),
            json!({"resourceType": "Observation", "valueQuantity": {"value": 7.2, "unit": "%"}}),
            json!({"resourceType": "Observation", "code": {"text": "HbA1c"}, "valueQuantity": {"unit": "%"}}),
        ]);

        assert_eq!(summarize_bundle(&bundle), "");
    }

    #[test]
    fn observation_values_print_as_written() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Observation", "code": {"text": "HbA1c"}, "valueQuantity": {"value": 7.2, "unit": "%"}}),
            json!({"resourceType": "Observation", "code": {"text": "Heart rate"}, "valueQuantity": {"value": 72, "unit": "beats/min"}}),
            json!({"resourceType": "Observation", "code": {"text": "Temperature"}, "valueQuantity": {"value": 98.0}}),
            json!({"resourceType": "Observation", "code": {"text": "Troponin"}, "valueQuantity": {"value": 0, "unit": "ng/mL"}}),
        ]);

        assert_eq!(
            summarize_bundle(&bundle),
            "Lab/Observation: HbA1c = 7.2 %\n\
             Lab/Observation: Heart rate = 72 beats/min\n\
             Lab/Observation: Temperature = 98.0 \n\
             Lab/Observation: Troponin = 0 ng/mL"
        );
    }

    #[test]
    fn zero_reading_is_still_reported() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Observation", "code": {"text": "Troponin"}, "valueQuantity": {"value": 0, "unit": "ng/mL"}}),
            json!({"resourceType": "Observation", "code": {"text": "Ketones"}, "valueQuantity": {"value": 0.0, "unit": "mmol/L"}}),
        ]);

        assert_eq!(
            summarize_bundle(&bundle),
            "Lab/Observation: Troponin = 0 ng/mL\nLab/Observation: Ketones = 0.0 mmol/L"
        );
    }

    #[test]
    fn missing_fields_use_unknown_wording() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Patient", "id": "p9"}),
            json!({"resourceType": "Condition"}),
            json!({"resourceType": "MedicationRequest", "medicationCodeableConcept": {"coding": []}}),
        ]);

        assert_eq!(
            summarize_bundle(&bundle),
            "Patient: Unknown, Gender: Unknown, DOB: Unknown\n\
             Condition: Unknown condition\n\
             Medication: Unknown medication"
        );
    }

    #[test]
    fn other_types_are_silent_by_default() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Procedure", "code": {"text": "Appendectomy"}}),
            json!({"resourceType": "Encounter"}),
            json!({"resourceType": "Practitioner"}),
            json!({"id": "untyped"}),
        ]);

        assert_eq!(summarize_bundle(&bundle), "");
    }

    #[test]
    fn extended_templates_cover_remaining_clinical_types() {
        let bundle = bundle_of(vec![
            json!({"resourceType": "Procedure", "code": {"text": "Appendectomy"}}),
            json!({"resourceType": "Immunization", "vaccineCode": {"text": "Influenza"}}),
            json!({"resourceType": "AllergyIntolerance", "code": {"text": "Penicillin"}}),
            json!({"resourceType": "Encounter", "type": [{"text": "Emergency visit"}]}),
            json!({"resourceType": "Encounter"}),
            json!({"resourceType": "Practitioner"}),
        ]);
        let config = SummaryConfig {
            extended_templates: true,
        };

        assert_eq!(
            summarize_with(&bundle, &config),
            "Procedure: Appendectomy\n\
             Immunization: Influenza\n\
             Allergy: Penicillin\n\
             Encounter: Emergency visit\n\
             Encounter: Unknown encounter"
        );
    }

    #[test]
    fn empty_bundle_is_empty_text() {
        assert_eq!(summarize_bundle(&Bundle::collection()), "");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let bundle = bundle_of(vec![
            jane(),
            json!({"resourceType": "MedicationRequest", "medicationCodeableConcept": {"text": "Lisinopril"}}),
        ]);

        assert_eq!(summarize_bundle(&bundle), summarize_bundle(&bundle));
    }
}
