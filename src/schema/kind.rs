//! Shape classification for JSON schema nodes
//!
//! Schema fragments stay as open `serde_json::Value` trees; the passes
//! dispatch on the tag computed here instead of probing keys ad hoc.

use serde_json::{Map, Value};

/// The structural role a schema node plays during normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// Node carries `allOf`
    Composition(&'a [Value]),
    /// Object-typed node, with its declared properties if any
    Object {
        properties: Option<&'a Map<String, Value>>,
    },
    /// Array-typed node, with its item schema if any
    Array { items: Option<&'a Value> },
    /// Anything else: scalars, enums, booleans, untyped fragments
    Scalar,
}

impl<'a> SchemaKind<'a> {
    pub fn is_object(&self) -> bool {
        matches!(self, SchemaKind::Object { .. })
    }
}

/// Classify a schema node.
///
/// `allOf` takes precedence, then the declared `type`, then the presence of
/// `properties` or `items` on untyped nodes.
pub fn classify(schema: &Value) -> SchemaKind<'_> {
    let Some(map) = schema.as_object() else {
        return SchemaKind::Scalar;
    };

    if let Some(members) = map.get("allOf").and_then(Value::as_array) {
        return SchemaKind::Composition(members);
    }

    let properties = map.get("properties").and_then(Value::as_object);
    let items = map.get("items").filter(|v| v.is_object() || v.is_array());

    if declares_type(map, "object") {
        return SchemaKind::Object { properties };
    }
    if declares_type(map, "array") {
        return SchemaKind::Array { items };
    }
    if map.get("type").is_none() {
        if properties.is_some() {
            return SchemaKind::Object { properties };
        }
        if items.is_some() {
            return SchemaKind::Array { items };
        }
    }

    SchemaKind::Scalar
}

/// `type` may be a single name or a list such as `["object", "null"]`
fn declares_type(map: &Map<String, Value>, name: &str) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(name)),
        _ => false,
    }
}

/// Rebuild `schema` with `f` applied to each direct child schema.
///
/// Object nodes map their `properties` values, array nodes their `items`
/// (a single schema or a tuple list). Other nodes are copied unchanged.
pub fn map_children<F>(schema: &Value, f: F) -> Value
where
    F: Fn(&Value) -> Value,
{
    let mut out = schema.clone();
    let Value::Object(node) = &mut out else {
        return out;
    };

    match classify(schema) {
        SchemaKind::Object {
            properties: Some(properties),
        } => {
            let mapped: Map<String, Value> = properties
                .iter()
                .map(|(name, child)| (name.clone(), f(child)))
                .collect();
            node.insert("properties".to_string(), Value::Object(mapped));
        }
        SchemaKind::Array { items: Some(items) } => {
            let mapped = match items {
                Value::Array(tuple) => Value::Array(tuple.iter().map(&f).collect()),
                single => f(single),
            };
            node.insert("items".to_string(), mapped);
        }
        _ => {}
    }

    out
}
