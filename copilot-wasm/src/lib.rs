//! Framework-neutral WASM <-> JavaScript bridge for browser dashboards.

use copilot_core::{Bundle, CopilotError, SummaryConfig};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JsSummaryConfig {
    #[serde(default)]
    extended_templates: Option<bool>,
}

impl From<JsSummaryConfig> for SummaryConfig {
    fn from(cfg: JsSummaryConfig) -> Self {
        let mut base = SummaryConfig::default();
        if let Some(extended) = cfg.extended_templates {
            base.extended_templates = extended;
        }
        base
    }
}

#[derive(Serialize)]
struct JsPatient {
    id: String,
    label: String,
}

/// `[{id, label}]` for every Patient in the document (a Bundle or a single resource).
#[wasm_bindgen(js_name = listPatients)]
pub fn list_patients(document: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let bundle = read_bundle(document)?;
    let patients = patients_of(&bundle).map_err(|err| JsValue::from_str(&err.to_string()))?;

    to_value(&patients).map_err(|err| JsValue::from_str(&format!("Cannot serialize patients: {err}")))
}

/// Summary text for one patient of the document.
#[wasm_bindgen(js_name = summarizePatient)]
pub fn summarize_patient(
    document: JsValue,
    patient_id: &str,
    config: Option<JsValue>,
) -> Result<String, JsValue> {
    init_panic_hook();
    let bundle = read_bundle(document)?;

    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsSummaryConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Cannot read config: {err}")))?;
            SummaryConfig::from(cfg)
        }
        _ => SummaryConfig::default(),
    };

    Ok(copilot_fhir::patient_summary(&bundle, patient_id, &cfg))
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_bundle(document: JsValue) -> Result<Bundle, JsValue> {
    let value = from_value::<serde_json::Value>(document)
        .map_err(|err| JsValue::from_str(&format!("Cannot read JSON document: {err}")))?;
    copilot_fhir::load_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn patients_of(bundle: &Bundle) -> Result<Vec<JsPatient>, CopilotError> {
    Ok(copilot_fhir::require_patients(bundle)?
        .into_iter()
        .map(|patient| JsPatient {
            id: patient.id,
            label: patient.label,
        })
        .collect())
}
