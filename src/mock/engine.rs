//! Per-request pipeline: route, normalize, generate, split

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::errors::Result;
use crate::generate::{GenerationRequest, Generator, QueryParams};
use crate::openapi::SpecDocument;
use crate::routing::{ResponseTarget, RouteTarget, Router};
use crate::schema::{build_envelope, normalize, split_envelope};

/// An incoming request, reduced to what routing and generation need
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub query: QueryParams,
}

impl MockRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            query: QueryParams::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }
}

/// Status and optional JSON body to send back
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl MockResponse {
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// A routed request whose body schema is ready for generation
#[derive(Debug, Clone)]
pub struct PreparedRoute<'a> {
    pub route: RouteTarget<'a>,
    /// Strict envelope schema, `None` for responses without content
    pub envelope: Option<Value>,
}

/// Strict envelope schema for a routed response, `None` when it has no content
pub fn envelope_schema(route: &RouteTarget<'_>) -> Option<Value> {
    match &route.response {
        ResponseTarget::Empty => None,
        ResponseTarget::Schema(schema) => Some(build_envelope(normalize(schema))),
    }
}

/// Turns requests into generated responses for one spec document
pub struct MockEngine<G> {
    router: Router,
    generator: G,
    system_prompt: String,
}

impl<G: Generator> MockEngine<G> {
    pub fn new(spec: Arc<SpecDocument>, generator: G) -> Self {
        Self {
            router: Router::new(spec),
            generator,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn spec(&self) -> &SpecDocument {
        self.router.spec()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route a request and build its envelope schema without generating
    pub fn prepare(&self, method: &str, path: &str) -> Result<PreparedRoute<'_>> {
        let route = self.router.route(method, path)?;
        let envelope = envelope_schema(&route);
        Ok(PreparedRoute { route, envelope })
    }

    /// Run the full pipeline for one request
    pub async fn handle(&self, request: &MockRequest) -> Result<MockResponse> {
        let PreparedRoute { route, envelope } = self.prepare(&request.method, &request.path)?;

        let Some(envelope) = envelope else {
            return Ok(MockResponse::empty(route.status));
        };

        debug!(
            template = route.template,
            schema = %envelope,
            "Prepared envelope schema"
        );

        let generation = GenerationRequest::new(&self.system_prompt, &request.query, &route.params, envelope);
        let generated = self.generator.generate(&generation).await?;
        debug!(generated = %generated, "Generated envelope");
        let response = split_envelope(generated, route.status)?;

        Ok(MockResponse {
            status: response.status,
            body: Some(response.body),
        })
    }

    /// Like [`handle`](Self::handle) but maps failures to their HTTP status
    pub async fn respond(&self, request: &MockRequest) -> MockResponse {
        match self.handle(request).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_routing() {
                    debug!(method = %request.method, path = %request.path, reason = %e, "Request not routed");
                } else {
                    error!(method = %request.method, path = %request.path, error = %e, "Request failed");
                }
                MockResponse::empty(e.http_status())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SpecmockError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a fixed value and remembers the last request
    struct Scripted {
        reply: Result<Value>,
        seen: Mutex<Option<GenerationRequest>>,
    }

    impl Scripted {
        fn new(reply: Result<Value>) -> Self {
            Self {
                reply,
                seen: Mutex::new(None),
            }
        }
    }

    impl Generator for Scripted {
        async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
            *self.seen.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(SpecmockError::Generation(e.to_string())),
            }
        }
    }

    fn spec() -> Arc<SpecDocument> {
        Arc::new(
            SpecDocument::from_value(&json!({
                "openapi": "3.0.0",
                "info": {"title": "t", "version": "1"},
                "paths": {
                    "/users/{id}": {"get": {"responses": {"200": {"description": "ok", "content": {
                        "application/json": {"schema": {
                            "type": "object",
                            "properties": {"id": {"type": "string", "format": "uuid"}}
                        }}
                    }}}}},
                    "/health": {"head": {"responses": {"204": {"description": "up"}}}}
                }
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_handle_generates_body() {
        let engine = MockEngine::new(spec(), Scripted::new(Ok(json!({"body": {"id": "u1"}, "status": 200}))));
        let request = MockRequest::new("GET", "/users/u1").with_query("expand", "true");

        let response = engine.handle(&request).await.unwrap();
        assert_eq!(response, MockResponse { status: 200, body: Some(json!({"id": "u1"})) });

        let seen = engine.generator.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.system, DEFAULT_SYSTEM_PROMPT);
        assert!(seen.user.contains("\"expand\":\"true\""));
        assert!(seen.user.contains("\"id\":\"u1\""));
        assert_eq!(seen.schema["required"], json!(["body", "status"]));
        assert_eq!(
            seen.schema["properties"]["body"],
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}},
                "additionalProperties": false,
                "required": ["id"]
            })
        );
    }

    #[tokio::test]
    async fn test_empty_response_skips_generator() {
        let engine = MockEngine::new(spec(), Scripted::new(Ok(json!(null))));
        let response = engine.handle(&MockRequest::new("HEAD", "/health")).await.unwrap();
        assert_eq!(response, MockResponse::empty(204));
        assert!(engine.generator.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_respond_maps_errors() {
        let engine = MockEngine::new(spec(), Scripted::new(Ok(json!({"unexpected": true}))));

        assert_eq!(engine.respond(&MockRequest::new("GET", "/nope")).await.status, 404);
        assert_eq!(engine.respond(&MockRequest::new("POST", "/health")).await.status, 405);
        assert_eq!(engine.respond(&MockRequest::new("GET", "/users/1")).await, MockResponse::empty(500));
    }

    #[tokio::test]
    async fn test_generator_failure_is_server_error() {
        let engine = MockEngine::new(
            spec(),
            Scripted::new(Err(SpecmockError::Generation("boom".to_string()))),
        );
        let err = engine.handle(&MockRequest::new("GET", "/users/1")).await.unwrap_err();
        assert!(matches!(err, SpecmockError::Generation(_)));
    }

    #[test]
    fn test_prepare_builds_envelope() {
        let engine = MockEngine::new(spec(), Scripted::new(Ok(json!(null))));
        let prepared = engine.prepare("get", "/users/abc/").unwrap();
        assert_eq!(prepared.route.template, "/users/{id}");
        let envelope = prepared.envelope.unwrap();
        assert_eq!(envelope["properties"]["status"], json!({"type": "integer"}));
        assert_eq!(envelope["additionalProperties"], json!(false));
    }
}
