//! The body + status wrapper handed to the generator

use serde_json::{json, Value};
use tracing::warn;

use crate::errors::{Result, SpecmockError};

/// Wrap a strict body schema into the object the generator must produce
pub fn build_envelope(body: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "body": body,
            "status": {
                "type": "integer"
            }
        },
        "required": ["body", "status"],
        "additionalProperties": false
    })
}

/// A generated response split back out of its envelope
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedResponse {
    pub status: u16,
    pub body: Value,
}

/// Split a generated envelope into status and body.
///
/// A value that is not an object with `body` and an integer `status` is a
/// generation failure. A status outside the HTTP range falls back to
/// `declared_status`.
pub fn split_envelope(value: Value, declared_status: u16) -> Result<GeneratedResponse> {
    let Value::Object(mut envelope) = value else {
        return Err(SpecmockError::Generation(
            "generated value is not a JSON object".to_string(),
        ));
    };

    let body = envelope.shift_remove("body").ok_or_else(|| {
        SpecmockError::Generation("generated value has no `body`".to_string())
    })?;

    let raw_status = envelope
        .get("status")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            SpecmockError::Generation("generated value has no integer `status`".to_string())
        })?;

    let status = match u16::try_from(raw_status) {
        Ok(code) if (100..=599).contains(&code) => code,
        _ => {
            warn!(
                generated = raw_status,
                declared = declared_status,
                "Generated status is not a valid HTTP status, using declared status"
            );
            declared_status
        }
    };

    Ok(GeneratedResponse { status, body })
}
