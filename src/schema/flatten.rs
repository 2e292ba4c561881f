//! `allOf` flattening

use serde_json::{Map, Value};

use super::kind::{classify, map_children, SchemaKind};

/// Recursively fold every `allOf` composition into a single schema node.
///
/// Members are flattened depth-first, then folded in order on top of the
/// node's own sibling keys: objects merge key by key, later leaf values win,
/// `required` lists are unioned and non-empty `description`s are joined with
/// a space. The result never contains `allOf` along `properties`/`items`.
pub fn merge_all_of(schema: &Value) -> Value {
    match classify(schema) {
        SchemaKind::Composition(members) => {
            let mut base = schema.as_object().cloned().unwrap_or_default();
            base.shift_remove("allOf");

            let folded = members
                .iter()
                .map(merge_all_of)
                .fold(Folded::from_base(base), Folded::absorb);

            map_children(&Value::Object(folded.finish()), merge_all_of)
        }
        _ => map_children(schema, merge_all_of),
    }
}

/// Accumulator for folding composition members
struct Folded {
    node: Map<String, Value>,
    required: Option<Vec<String>>,
    descriptions: Vec<String>,
}

impl Folded {
    fn from_base(mut node: Map<String, Value>) -> Self {
        let mut folded = Self {
            required: None,
            descriptions: Vec::new(),
            node: Map::new(),
        };
        folded.take_special(&mut node);
        folded.node = node;
        folded
    }

    fn absorb(mut self, member: Value) -> Self {
        let Value::Object(mut member) = member else {
            return self;
        };
        self.take_special(&mut member);
        for (key, value) in member {
            merge_key(&mut self.node, key, value);
        }
        self
    }

    /// Pull out the two keys that are combined rather than overwritten
    fn take_special(&mut self, node: &mut Map<String, Value>) {
        if let Some(required) = node.shift_remove("required") {
            let union = self.required.get_or_insert_with(Vec::new);
            for name in required.as_array().into_iter().flatten().filter_map(Value::as_str) {
                if !union.iter().any(|existing| existing == name) {
                    union.push(name.to_string());
                }
            }
        }
        if let Some(Value::String(description)) = node.shift_remove("description") {
            if !description.is_empty() {
                self.descriptions.push(description);
            }
        }
    }

    fn finish(self) -> Map<String, Value> {
        let mut node = self.node;
        if let Some(required) = self.required {
            node.insert(
                "required".to_string(),
                Value::Array(required.into_iter().map(Value::String).collect()),
            );
        }
        if !self.descriptions.is_empty() {
            node.insert(
                "description".to_string(),
                Value::String(self.descriptions.join(" ")),
            );
        }
        node
    }
}

fn merge_key(target: &mut Map<String, Value>, key: String, value: Value) {
    match target.get_mut(&key) {
        Some(existing) => deep_merge(existing, value),
        None => {
            target.insert(key, value);
        }
    }
}

/// Objects merge recursively; any other value replaces the existing one
fn deep_merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, value) in right {
                merge_key(left, key, value);
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn required_set(schema: &Value) -> BTreeSet<String> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_required_union() {
        let schema = json!({"allOf": [{"required": ["a"]}, {"required": ["b"]}]});
        let flat = merge_all_of(&schema);

        assert_eq!(required_set(&flat), ["a", "b"].iter().map(|s| s.to_string()).collect());
        assert!(flat.get("allOf").is_none());
    }

    #[test]
    fn test_required_union_has_no_duplicates() {
        let schema = json!({"allOf": [{"required": ["a", "b"]}, {"required": ["b", "c"]}]});
        let flat = merge_all_of(&schema);
        assert_eq!(flat["required"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_descriptions_concatenate_in_order() {
        let schema = json!({
            "allOf": [
                {"description": "A pet."},
                {"description": ""},
                {"type": "object"},
                {"description": "With an owner."}
            ]
        });
        let flat = merge_all_of(&schema);
        assert_eq!(flat["description"], "A pet. With an owner.");
    }

    #[test]
    fn test_no_description_key_when_all_empty() {
        let schema = json!({"allOf": [{"type": "string"}, {"description": ""}]});
        let flat = merge_all_of(&schema);
        assert!(flat.get("description").is_none());
    }

    #[test]
    fn test_later_members_override_leaves() {
        let schema = json!({"allOf": [{"type": "string", "format": "date"}, {"format": "date-time"}]});
        let flat = merge_all_of(&schema);
        assert_eq!(flat, json!({"type": "string", "format": "date-time"}));
    }

    #[test]
    fn test_properties_merge_across_members() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"id": {"type": "integer"}}},
                {"type": "object", "properties": {"name": {"type": "string"}}}
            ]
        });
        let flat = merge_all_of(&schema);
        let names: Vec<&String> = flat["properties"].as_object().unwrap().keys().collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_sibling_keys_are_kept() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string", "minLength": 1}},
            "allOf": [{"required": ["name"]}]
        });
        let flat = merge_all_of(&schema);
        assert_eq!(
            flat,
            json!({
                "type": "object",
                "properties": {"name": {"type": "string", "minLength": 1}},
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_nested_composition_is_resolved() {
        let schema = json!({
            "allOf": [
                {"allOf": [{"required": ["a"]}, {"description": "inner"}]},
                {"description": "outer", "required": ["b"]}
            ]
        });
        let flat = merge_all_of(&schema);
        assert_eq!(flat["description"], "inner outer");
        assert_eq!(flat["required"], json!(["a", "b"]));
    }

    #[test]
    fn test_composition_inside_properties_and_items() {
        let schema = json!({
            "type": "object",
            "properties": {
                "owner": {"allOf": [{"type": "object"}, {"properties": {"id": {"type": "integer"}}}]},
                "tags": {
                    "type": "array",
                    "items": {"allOf": [{"type": "string"}, {"description": "tag"}]}
                }
            }
        });
        let flat = merge_all_of(&schema);
        assert_eq!(
            flat["properties"]["owner"],
            json!({"type": "object", "properties": {"id": {"type": "integer"}}})
        );
        assert_eq!(
            flat["properties"]["tags"]["items"],
            json!({"type": "string", "description": "tag"})
        );
    }

    #[test]
    fn test_idempotent() {
        let schema = json!({
            "type": "object",
            "description": "Order",
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {"allOf": [
                        {"type": "object", "properties": {"sku": {"type": "string"}}, "required": ["sku"]},
                        {"properties": {"qty": {"type": "integer", "minimum": 1}}, "required": ["qty"]}
                    ]}
                }
            },
            "allOf": [{"required": ["lines"], "description": "with lines"}]
        });
        let once = merge_all_of(&schema);
        let twice = merge_all_of(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let schema = json!({"allOf": [{"type": "object"}]});
        let before = schema.clone();
        let _ = merge_all_of(&schema);
        assert_eq!(schema, before);
    }
}
