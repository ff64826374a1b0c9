//! Response-shape normalization.
//!
//! The backend is inconsistent about list responses: some endpoints wrap
//! the list (`{"consents": [...]}`), some return the bare array. Both
//! shapes are accepted everywhere; anything else reads as an empty list.
//! Items that do not decode (an unknown consent status, say) are dropped
//! from the list with a warning.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{Patient, PatientPage};

/// Unwrap `payload.<field>`, else `payload` itself, else `[]`.
pub fn unwrap_list<T: DeserializeOwned>(payload: Value, field: &str) -> Vec<T> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(field, error = %e, "Skipping undecodable list item");
                None
            }
        })
        .collect()
}

/// Unwrap a patient page: `patients` (else empty) and `total` (else 0).
pub fn unwrap_patient_page(payload: Value) -> PatientPage {
    let total = payload.get("total").and_then(Value::as_u64).unwrap_or(0);
    let patients: Vec<Patient> = match payload {
        Value::Object(mut map) => match map.remove("patients") {
            Some(list @ Value::Array(_)) => unwrap_list(list, "patients"),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    PatientPage { patients, total }
}
