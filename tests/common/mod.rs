//! Shared helpers for specmock integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::net::TcpListener;

use specmock::config::ServerConfig;
use specmock::errors::{Result, SpecmockError};
use specmock::generate::{GenerationRequest, Generator};
use specmock::mock::{MockEngine, MockServer};
use specmock::openapi::{load_spec, SpecDocument};

/// Path of a file under tests/fixtures
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// The petstore fixture, loaded and dereferenced
pub fn petstore() -> Arc<SpecDocument> {
    Arc::new(load_spec(&fixture("petstore.yaml")).expect("petstore fixture loads"))
}

/// Generator that replays canned envelopes and records what it was asked
#[derive(Clone, Default)]
pub struct StubGenerator {
    replies: Arc<Mutex<Vec<Result<Value>>>>,
    seen: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl StubGenerator {
    pub fn replying(reply: Value) -> Self {
        let stub = Self::default();
        stub.push(Ok(reply));
        stub
    }

    pub fn failing(message: &str) -> Self {
        let stub = Self::default();
        stub.push(Err(SpecmockError::Generation(message.to_string())));
        stub
    }

    pub fn push(&self, reply: Result<Value>) {
        self.replies.lock().unwrap().push(reply);
    }

    /// Requests seen so far, oldest first
    pub fn seen(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Generator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        self.seen.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Err(SpecmockError::Generation("no scripted reply left".to_string())),
            // The last reply is reused for every further request
            1 => match &replies[0] {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(SpecmockError::Generation(e.to_string())),
            },
            _ => replies.remove(0),
        }
    }
}

/// Serve `spec` with `generator` on an ephemeral port
pub async fn spawn_server(spec: Arc<SpecDocument>, generator: StubGenerator, cors: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServerConfig::new().with_port(addr.port());
    config.cors = cors;
    config.log_requests = false;

    let server = MockServer::new(config, MockEngine::new(spec, generator));
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    addr
}
