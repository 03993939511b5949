//! Boundary normalisation of diagnosis responses.
//!
//! Accepted shapes:
//! - a bare object: `{"summary": …}`
//! - a one-element array: `[{"summary": …}]`
//! - a workflow item envelope: `[{"json": {"summary": …}}]`
//!
//! Anything else is malformed.

use serde_json::{Map, Value};
use vigil_core::Diagnosis;

use crate::errors::{DiagnosisError, DiagnosisResult};

/// Turn a raw response body into exactly one [`Diagnosis`].
pub fn normalize_response(value: Value) -> DiagnosisResult<Diagnosis> {
    let object = match value {
        Value::Object(obj) => obj,
        Value::Array(items) => single_item(items)?,
        other => {
            return Err(DiagnosisError::malformed(format!(
                "expected object or array, got {}",
                type_name(&other)
            )));
        }
    };
    Diagnosis::from_object(object).map_err(|e| DiagnosisError::malformed(e.to_string()))
}

fn single_item(items: Vec<Value>) -> DiagnosisResult<Map<String, Value>> {
    let len = items.len();
    let mut iter = items.into_iter();
    let item = match (iter.next(), len) {
        (Some(item), 1) => item,
        (None, _) => return Err(DiagnosisError::malformed("empty array")),
        _ => return Err(DiagnosisError::malformed(format!("expected one item, got {len}"))),
    };
    match item {
        Value::Object(mut obj) => {
            if obj.len() == 1 && obj.contains_key("json") {
                match obj.remove("json") {
                    Some(Value::Object(inner)) => Ok(inner),
                    Some(other) => Err(DiagnosisError::malformed(format!(
                        "envelope `json` is {}",
                        type_name(&other)
                    ))),
                    None => Err(DiagnosisError::malformed("envelope without `json`")),
                }
            } else {
                Ok(obj)
            }
        }
        other => Err(DiagnosisError::malformed(format!(
            "array item is {}",
            type_name(&other)
        ))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
