//! Spec file loading
//!
//! Reads a JSON or YAML spec, inlines local references under `paths` and
//! builds the [`SpecDocument`] the server shares across requests.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::document::SpecDocument;
use super::resolver::Resolver;
use crate::errors::{Result, SpecmockError};

/// Maximum spec file size (16 MB)
const MAX_SPEC_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Load, dereference and parse a spec file
pub fn load_spec(path: &Path) -> Result<SpecDocument> {
    let metadata = fs::metadata(path)?;

    if metadata.len() > MAX_SPEC_FILE_SIZE {
        return Err(SpecmockError::Spec(format!(
            "Spec file too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_SPEC_FILE_SIZE
        )));
    }

    let content = fs::read_to_string(path)?;
    let value = parse_content(&content, path.extension().and_then(|e| e.to_str()))?;
    let document = document_from_value(value)?;

    info!(
        path = %path.display(),
        title = %document.title,
        version = %document.version,
        paths = document.paths.len(),
        operations = document.operation_count(),
        "Loaded spec"
    );

    Ok(document)
}

/// Parse raw spec text, using the extension as a format hint
pub fn parse_content(content: &str, extension: Option<&str>) -> Result<Value> {
    match extension {
        Some("yaml") | Some("yml") => serde_yaml::from_str(content)
            .map_err(|e| SpecmockError::Spec(format!("Failed to parse YAML: {}", e))),
        Some("json") => serde_json::from_str(content)
            .map_err(|e| SpecmockError::Spec(format!("Failed to parse JSON: {}", e))),
        // Try JSON first, then YAML
        _ => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| SpecmockError::Spec(format!("Failed to parse spec: {}", e))),
    }
}

/// Dereference `paths` and build the document.
///
/// Only `paths` is resolved so that unused cyclic components don't fail
/// the load.
pub fn document_from_value(mut value: Value) -> Result<SpecDocument> {
    if let Some(paths) = value.get("paths") {
        let resolved = Resolver::new(&value).resolve(paths)?;
        debug!("Inlined references under paths");
        value["paths"] = resolved;
    }
    SpecDocument::from_value(&value)
}
