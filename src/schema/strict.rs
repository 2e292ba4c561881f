//! Closing objects: no additional properties, every property required

use serde_json::Value;

use super::kind::{classify, map_children, SchemaKind};

/// Recursively set `additionalProperties: false` on every object node
pub fn disallow_additional_properties(schema: &Value) -> Value {
    let mut out = map_children(schema, disallow_additional_properties);
    if classify(&out).is_object() {
        if let Value::Object(node) = &mut out {
            node.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
    out
}

/// Recursively replace `required` on every object node with the full list
/// of its declared property names
pub fn require_all_properties(schema: &Value) -> Value {
    let mut out = map_children(schema, require_all_properties);
    let names: Option<Vec<Value>> = match classify(&out) {
        SchemaKind::Object { properties } => Some(
            properties
                .into_iter()
                .flat_map(|props| props.keys())
                .map(|name| Value::String(name.clone()))
                .collect(),
        ),
        _ => None,
    };

    if let (Some(names), Value::Object(node)) = (names, &mut out) {
        node.insert("required".to_string(), Value::Array(names));
    }
    out
}
