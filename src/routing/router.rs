//! Request routing against the spec document

use std::sync::Arc;

use serde_json::Value;

use super::matcher::{PathMatcher, PathParams};
use crate::errors::{Result, SpecmockError};
use crate::openapi::SpecDocument;

/// What the selected operation answers with
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseTarget<'a> {
    /// Declared response has no content: answer with the status only
    Empty,
    /// Raw JSON schema of the declared response body
    Schema(&'a Value),
}

/// A routed request
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTarget<'a> {
    pub template: &'a str,
    pub method: String,
    pub params: PathParams,
    /// Status of the first declared response
    pub status: u16,
    pub response: ResponseTarget<'a>,
}

/// Routes requests to operations of a shared, read-only spec document
#[derive(Debug, Clone)]
pub struct Router {
    spec: Arc<SpecDocument>,
    matcher: PathMatcher,
}

impl Router {
    pub fn new(spec: Arc<SpecDocument>) -> Self {
        let matcher = PathMatcher::new(spec.templates());
        Self { spec, matcher }
    }

    pub fn spec(&self) -> &SpecDocument {
        &self.spec
    }

    /// Select the operation and response for `method` and `path`.
    ///
    /// Fails with `NotFound` when no template matches, `MethodNotAllowed`
    /// when the template has no operation for the method and
    /// `SchemaUnavailable` when the first declared response has content but
    /// no JSON schema. An operation without responses answers 200 with no
    /// body.
    pub fn route(&self, method: &str, path: &str) -> Result<RouteTarget<'_>> {
        let matched = self.matcher.find(path).ok_or_else(|| SpecmockError::NotFound {
            path: path.to_string(),
        })?;

        let method = method.to_ascii_lowercase();
        let operation = self
            .spec
            .operation(matched.template, &method)
            .ok_or_else(|| SpecmockError::MethodNotAllowed {
                path: matched.template.to_string(),
                method: method.clone(),
            })?;

        let Some((status, response)) = operation.first_response() else {
            return Ok(RouteTarget {
                template: matched.template,
                method,
                params: matched.params,
                status: 200,
                response: ResponseTarget::Empty,
            });
        };

        let target = if response.content.is_none() {
            ResponseTarget::Empty
        } else {
            let schema = response.json_schema().ok_or_else(|| SpecmockError::SchemaUnavailable {
                path: matched.template.to_string(),
                method: method.clone(),
                status,
            })?;
            ResponseTarget::Schema(schema)
        };

        Ok(RouteTarget {
            template: matched.template,
            method,
            params: matched.params,
            status,
            response: target,
        })
    }
}
