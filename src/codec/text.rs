//! Human-readable formats: JSON (`serde_json`) and YAML (`serde_yaml`).

use serde_json::Value;

use crate::errors::{ConfigurateError, Result};

pub fn encode_json(value: &Value, pretty: bool) -> Result<Vec<u8>> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    encoded.map_err(|e| ConfigurateError::SerializationError(format!("json: {e}")))
}

pub fn decode_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| ConfigurateError::SerializationError(format!("json: {e}")))
}

pub fn encode_yaml(value: &Value) -> Result<Vec<u8>> {
    serde_yaml::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| ConfigurateError::SerializationError(format!("yaml: {e}")))
}

/// Deserializes straight into a JSON value, so YAML-only constructs
/// (non-string keys, tags) are rejected instead of silently coerced.
pub fn decode_yaml(bytes: &[u8]) -> Result<Value> {
    serde_yaml::from_slice(bytes)
        .map_err(|e| ConfigurateError::SerializationError(format!("yaml: {e}")))
}
