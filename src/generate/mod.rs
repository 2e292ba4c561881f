//! Response generation
//!
//! A [`Generator`] receives a system instruction, the request context and a
//! strict output schema, and returns one JSON value conforming to it.

pub mod openai;

use std::future::Future;

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::Result;
use crate::routing::PathParams;

pub use openai::OpenAiGenerator;

/// Name under which the output schema is registered with the model
pub const SCHEMA_NAME: &str = "response";

/// Query parameters as received, last value wins for repeated keys
pub type QueryParams = IndexMap<String, String>;

/// Everything the model needs for one response
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub schema: Value,
}

impl GenerationRequest {
    pub fn new(system: &str, query: &QueryParams, params: &PathParams, schema: Value) -> Self {
        Self {
            system: system.to_string(),
            user: user_context(query, params),
            schema,
        }
    }
}

/// User message listing the request's query and path parameters
pub fn user_context(query: &QueryParams, params: &PathParams) -> String {
    let query = serde_json::to_string(query).unwrap_or_else(|_| "{}".to_string());
    let params = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
    format!("Query parameters: {}\n\nPath parameters: {}", query, params)
}

/// Produces a JSON value for a strict schema
pub trait Generator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<Value>> + Send;
}
