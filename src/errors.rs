//! Error types for specmock

use thiserror::Error;

/// Main error type for specmock
#[derive(Error, Debug)]
pub enum SpecmockError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Spec error: {0}")]
    Spec(String),

    #[error("Circular $ref: {0}")]
    CircularReference(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("No path template matches {path}")]
    NotFound { path: String },

    #[error("{method} is not declared for {path}")]
    MethodNotAllowed { path: String, method: String },

    #[error("{method} {path} declares a {status} response without a JSON schema")]
    SchemaUnavailable {
        path: String,
        method: String,
        status: u16,
    },

    #[error("Generation error: {0}")]
    Generation(String),
}

impl SpecmockError {
    /// HTTP status code the mock server answers with when this error ends a request.
    ///
    /// Routing and schema availability outcomes are expected and map to
    /// client errors; everything else is a server error.
    pub fn http_status(&self) -> u16 {
        match self {
            SpecmockError::NotFound { .. } => 404,
            SpecmockError::MethodNotAllowed { .. } => 405,
            SpecmockError::SchemaUnavailable { .. } => 406,
            _ => 500,
        }
    }

    /// Whether this error is a routing outcome rather than a failure
    pub fn is_routing(&self) -> bool {
        self.http_status() != 500
    }
}

pub type Result<T> = std::result::Result<T, SpecmockError>;
