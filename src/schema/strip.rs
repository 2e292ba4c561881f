//! Removal of validation keywords that strict structured output rejects

use serde_json::Value;

use super::kind::map_children;

/// Keywords constraining value ranges or formats
pub const UNSUPPORTED_KEYWORDS: [&str; 8] = [
    "minLength",
    "maxLength",
    "format",
    "minItems",
    "maxItems",
    "pattern",
    "minimum",
    "maximum",
];

/// Recursively drop [`UNSUPPORTED_KEYWORDS`] from every node
pub fn remove_unsupported_keywords(schema: &Value) -> Value {
    let mut out = map_children(schema, remove_unsupported_keywords);
    if let Value::Object(node) = &mut out {
        for keyword in UNSUPPORTED_KEYWORDS {
            node.shift_remove(keyword);
        }
    }
    out
}
