//! Local `$ref` dereferencing
//!
//! Produces a new tree where every `#/...` reference is replaced by a copy
//! of its target. The spec document is left untouched.

use serde_json::{Map, Value};

use crate::errors::{Result, SpecmockError};

/// Resolves references against a document root
pub struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Return a copy of `node` with every reference inlined.
    ///
    /// A reference reached again while its own expansion is in progress is
    /// a cycle and fails with [`SpecmockError::CircularReference`].
    pub fn resolve(&self, node: &Value) -> Result<Value> {
        let mut chain = Vec::new();
        self.resolve_node(node, &mut chain)
    }

    fn resolve_node(&self, node: &Value, chain: &mut Vec<String>) -> Result<Value> {
        match node {
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => self.resolve_reference(reference, map, chain),
                _ => {
                    let mut out = Map::new();
                    for (key, value) in map {
                        out.insert(key.clone(), self.resolve_node(value, chain)?);
                    }
                    Ok(Value::Object(out))
                }
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_node(item, chain))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn resolve_reference(
        &self,
        reference: &str,
        node: &Map<String, Value>,
        chain: &mut Vec<String>,
    ) -> Result<Value> {
        if chain.iter().any(|seen| seen == reference) {
            chain.push(reference.to_string());
            return Err(SpecmockError::CircularReference(chain.join(" -> ")));
        }

        let target = self.lookup(reference)?;

        chain.push(reference.to_string());
        let resolved = self.resolve_node(target, chain);
        chain.pop();
        let mut resolved = resolved?;

        // Keys next to `$ref` override the target
        if let Value::Object(target) = &mut resolved {
            for (key, value) in node {
                if key != "$ref" {
                    target.insert(key.clone(), self.resolve_node(value, chain)?);
                }
            }
        }

        Ok(resolved)
    }

    fn lookup(&self, reference: &str) -> Result<&'a Value> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(SpecmockError::Spec(format!(
                "external reference not supported: {}",
                reference
            )));
        };

        let pointer = urlencoding::decode(fragment)
            .map_err(|e| SpecmockError::Spec(format!("invalid reference {}: {}", reference, e)))?;

        self.root
            .pointer(&pointer)
            .ok_or_else(|| SpecmockError::Spec(format!("unresolved reference: {}", reference)))
    }
}

/// Inline every local reference in `document`
pub fn dereference(document: &Value) -> Result<Value> {
    Resolver::new(document).resolve(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inlines_component_schema() {
        let doc = json!({
            "paths": {"/pets": {"get": {"responses": {"200": {"content": {"application/json": {
                "schema": {"$ref": "#/components/schemas/Pet"}
            }}}}}}},
            "components": {"schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}}
        });
        let resolved = dereference(&doc).unwrap();
        let schema = resolved
            .pointer("/paths/~1pets/get/responses/200/content/application~1json/schema")
            .unwrap();
        assert_eq!(schema, &doc["components"]["schemas"]["Pet"]);
        assert!(doc.pointer("/paths/~1pets/get/responses/200/content/application~1json/schema/$ref").is_some());
    }

    #[test]
    fn test_nested_references() {
        let doc = json!({
            "root": {"$ref": "#/defs/List"},
            "defs": {
                "List": {"type": "array", "items": {"$ref": "#/defs/Item"}},
                "Item": {"type": "string"}
            }
        });
        let resolved = Resolver::new(&doc).resolve(&doc["root"]).unwrap();
        assert_eq!(resolved, json!({"type": "array", "items": {"type": "string"}}));
    }

    #[test]
    fn test_repeated_non_cyclic_reference() {
        let doc = json!({
            "root": {"properties": {"a": {"$ref": "#/defs/S"}, "b": {"$ref": "#/defs/S"}}},
            "defs": {"S": {"type": "string"}}
        });
        let resolved = Resolver::new(&doc).resolve(&doc["root"]).unwrap();
        assert_eq!(resolved["properties"]["a"], resolved["properties"]["b"]);
    }

    #[test]
    fn test_sibling_keys_override_target() {
        let doc = json!({
            "root": {"$ref": "#/defs/S", "description": "local"},
            "defs": {"S": {"type": "string", "description": "shared"}}
        });
        let resolved = Resolver::new(&doc).resolve(&doc["root"]).unwrap();
        assert_eq!(resolved, json!({"type": "string", "description": "local"}));
    }

    #[test]
    fn test_cycle_fails_fast() {
        let doc = json!({
            "defs": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/defs/Node"}}}
            },
            "root": {"$ref": "#/defs/Node"}
        });
        let err = Resolver::new(&doc).resolve(&doc["root"]).unwrap_err();
        match err {
            SpecmockError::CircularReference(chain) => {
                assert_eq!(chain, "#/defs/Node -> #/defs/Node");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unresolved_and_external_references() {
        let doc = json!({"root": {"$ref": "#/missing"}});
        assert!(matches!(
            Resolver::new(&doc).resolve(&doc["root"]),
            Err(SpecmockError::Spec(_))
        ));

        let doc = json!({"root": {"$ref": "other.yaml#/Pet"}});
        assert!(matches!(
            Resolver::new(&doc).resolve(&doc["root"]),
            Err(SpecmockError::Spec(_))
        ));
    }

    #[test]
    fn test_escaped_pointer_segments() {
        let doc = json!({
            "root": {"$ref": "#/paths/~1users~1{id}/x"},
            "paths": {"/users/{id}": {"x": {"type": "boolean"}}}
        });
        let resolved = Resolver::new(&doc).resolve(&doc["root"]).unwrap();
        assert_eq!(resolved, json!({"type": "boolean"}));
    }
}
