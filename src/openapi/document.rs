//! In-memory spec document
//!
//! Built once from a dereferenced OpenAPI 3.x or Swagger 2.0 value and
//! shared read-only by every request. Paths, methods and responses keep
//! their document order.

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::{Result, SpecmockError};

/// Methods an OpenAPI path item may declare, lowercase
pub const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// The JSON media type responses are generated for
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Spec format the document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    Swagger2,
    OpenApi3,
}

/// Dereferenced spec document
#[derive(Debug, Clone)]
pub struct SpecDocument {
    pub title: String,
    pub version: String,
    pub spec_version: SpecVersion,
    /// Path template -> operations
    pub paths: IndexMap<String, PathItem>,
}

/// Operations of one path template, keyed by lowercase method
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    pub operations: IndexMap<String, Operation>,
}

/// One declared operation
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// Status key as written (`"200"`, `"2XX"`, `"default"`) -> response
    pub responses: IndexMap<String, ResponseSpec>,
}

/// One declared response
#[derive(Debug, Clone, Default)]
pub struct ResponseSpec {
    pub description: String,
    /// `None` when the response declares no content at all
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Content declared for one media type
#[derive(Debug, Clone, Default)]
pub struct MediaType {
    pub schema: Option<Value>,
}

impl SpecDocument {
    /// Build from a dereferenced document value
    pub fn from_value(value: &Value) -> Result<Self> {
        let spec_version = if value.get("openapi").is_some() {
            SpecVersion::OpenApi3
        } else if value.get("swagger").is_some() {
            SpecVersion::Swagger2
        } else {
            return Err(SpecmockError::Spec(
                "Unknown spec format: missing 'openapi' or 'swagger' field".to_string(),
            ));
        };

        let info = value.get("info");
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("Untitled API")
            .to_string();
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("1.0.0")
            .to_string();

        let mut paths = IndexMap::new();
        if let Some(path_map) = value.get("paths").and_then(Value::as_object) {
            for (template, item) in path_map {
                paths.insert(template.clone(), parse_path_item(item, spec_version));
            }
        }

        Ok(Self {
            title,
            version,
            spec_version,
            paths,
        })
    }

    /// Path templates in document order
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Look up the operation for a template and lowercase method
    pub fn operation(&self, template: &str, method: &str) -> Option<&Operation> {
        self.paths.get(template)?.operations.get(method)
    }

    /// Total number of declared operations
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|p| p.operations.len()).sum()
    }
}

impl Operation {
    /// The first declared response and its numeric status
    pub fn first_response(&self) -> Option<(u16, &ResponseSpec)> {
        self.responses
            .iter()
            .next()
            .map(|(key, response)| (status_from_key(key), response))
    }
}

impl ResponseSpec {
    /// Schema declared for `application/json`, if any
    pub fn json_schema(&self) -> Option<&Value> {
        self.content.as_ref()?.get(JSON_MEDIA_TYPE)?.schema.as_ref()
    }
}

/// Numeric status for a response key.
///
/// Range keys such as `2XX` map to the first code of the range; `default`,
/// codes outside 100..=599 and anything unparseable map to 200.
pub fn status_from_key(key: &str) -> u16 {
    if let Ok(code) = key.parse::<u16>() {
        return if (100..=599).contains(&code) { code } else { 200 };
    }
    let bytes = key.as_bytes();
    if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"xx") {
        if let Some(class) = (bytes[0] as char).to_digit(10).filter(|d| (1..=5).contains(d)) {
            return class as u16 * 100;
        }
    }
    200
}

fn parse_path_item(item: &Value, spec_version: SpecVersion) -> PathItem {
    let mut operations = IndexMap::new();
    if let Some(map) = item.as_object() {
        // Document order, not HTTP_METHODS order
        for (method, operation) in map {
            let method = method.to_ascii_lowercase();
            if HTTP_METHODS.contains(&method.as_str()) {
                operations.insert(method, parse_operation(operation, spec_version));
            }
        }
    }
    PathItem { operations }
}

fn parse_operation(operation: &Value, spec_version: SpecVersion) -> Operation {
    let responses = operation
        .get("responses")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(status, response)| {
                    let parsed = match spec_version {
                        SpecVersion::OpenApi3 => parse_response_v3(response),
                        SpecVersion::Swagger2 => parse_response_v2(response),
                    };
                    (status.clone(), parsed)
                })
                .collect()
        })
        .unwrap_or_default();

    Operation {
        operation_id: operation.get("operationId").and_then(Value::as_str).map(str::to_string),
        summary: operation.get("summary").and_then(Value::as_str).map(str::to_string),
        responses,
    }
}

fn parse_description(response: &Value) -> String {
    response
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn parse_response_v3(response: &Value) -> ResponseSpec {
    let content = response.get("content").and_then(Value::as_object).map(|content| {
        content
            .iter()
            .map(|(media_type, media)| {
                (
                    media_type.clone(),
                    MediaType {
                        schema: media.get("schema").cloned(),
                    },
                )
            })
            .collect()
    });

    ResponseSpec {
        description: parse_description(response),
        content,
    }
}

/// In Swagger 2.0 the schema sits directly under the response
fn parse_response_v2(response: &Value) -> ResponseSpec {
    let content = response.get("schema").map(|schema| {
        let mut content = IndexMap::new();
        content.insert(
            JSON_MEDIA_TYPE.to_string(),
            MediaType {
                schema: Some(schema.clone()),
            },
        );
        content
    });

    ResponseSpec {
        description: parse_description(response),
        content,
    }
}
