//! Mock HTTP server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::engine::{MockEngine, MockRequest, MockResponse};
use crate::config::ServerConfig;
use crate::errors::{Result, SpecmockError};
use crate::generate::{Generator, QueryParams};

/// Largest request head accepted before the connection is answered with 400
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Mock HTTP server
pub struct MockServer<G> {
    config: Arc<ServerConfig>,
    engine: Arc<MockEngine<G>>,
}

impl<G: Generator + 'static> MockServer<G> {
    pub fn new(config: ServerConfig, engine: MockEngine<G>) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }

    /// Bind the configured address and serve until the task is dropped
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .address()
            .parse()
            .map_err(|e| SpecmockError::Config(format!("Invalid address: {}", e)))?;

        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        let spec = self.engine.spec();
        info!(address = %addr, title = %spec.title, "Mock server listening on http://{}", addr);

        if spec.paths.is_empty() {
            warn!("Spec declares no paths, all requests will return 404");
        }
        for (template, item) in &spec.paths {
            for method in item.operations.keys() {
                info!("  {:7} {}", method.to_uppercase(), template);
            }
        }

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let engine = Arc::clone(&self.engine);
                    let config = Arc::clone(&self.config);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer_addr, &engine, &config).await {
                            warn!(peer = %peer_addr, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Accept error");
                }
            }
        }
    }
}

/// Handle a single connection
async fn handle_connection<G: Generator>(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    engine: &MockEngine<G>,
    config: &ServerConfig,
) -> Result<()> {
    let head = match read_head(&mut stream).await? {
        RequestHead::Empty => return Ok(()),
        RequestHead::TooLarge => {
            warn!(peer = %peer_addr, limit = MAX_HEAD_SIZE, "Request head too large");
            let response = MockResponse::empty(400);
            return write_response(&mut stream, "GET", &response, config.cors).await;
        }
        RequestHead::Complete(head) => head,
    };

    let started = Instant::now();
    let (request, response) = match parse_request(&head) {
        Ok(request) => {
            let response = engine.respond(&request).await;
            (request, response)
        }
        Err(e) => {
            warn!(peer = %peer_addr, error = %e, "Malformed request");
            (MockRequest::default(), MockResponse::empty(400))
        }
    };
    let elapsed_ms = started.elapsed().as_millis();

    write_response(&mut stream, &request.method, &response, config.cors).await?;

    if config.log_requests {
        info!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            elapsed_ms = elapsed_ms as u64,
            "{} {} {} - {} ms",
            request.method,
            request.path,
            response.status,
            elapsed_ms
        );
    }

    Ok(())
}

/// Outcome of reading a request head
#[derive(Debug, PartialEq)]
enum RequestHead {
    /// The peer closed without sending anything
    Empty,
    /// No blank line within [`MAX_HEAD_SIZE`] bytes
    TooLarge,
    Complete(String),
}

/// Read up to the end of the request head
async fn read_head<R: AsyncRead + Unpin>(stream: &mut R) -> Result<RequestHead> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            if end + 4 > MAX_HEAD_SIZE {
                return Ok(RequestHead::TooLarge);
            }
            break;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Ok(RequestHead::TooLarge);
        }
    }

    if buf.is_empty() {
        return Ok(RequestHead::Empty);
    }
    Ok(RequestHead::Complete(String::from_utf8_lossy(&buf).into_owned()))
}

/// Parse the request line of an HTTP request
fn parse_request(data: &str) -> Result<MockRequest> {
    let request_line = data
        .lines()
        .next()
        .ok_or_else(|| SpecmockError::Argument("Empty request".to_string()))?;

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(SpecmockError::Argument("Invalid request line".to_string()));
    }

    let method = parts[0].to_string();
    let target = parts[1];

    // Absolute-form targets carry scheme and authority
    let target = match target.find("://") {
        Some(scheme_end) => {
            let rest = &target[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
        }
        None => target,
    };

    let (path, query_str) = target.split_once('?').unwrap_or((target, ""));

    Ok(MockRequest {
        method,
        path: path.to_string(),
        query: parse_query_string(query_str),
    })
}

/// Parse query string into an ordered map
fn parse_query_string(query: &str) -> QueryParams {
    let mut map = QueryParams::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = key.replace('+', " ");
        let value = value.replace('+', " ");
        map.insert(
            urlencoding::decode(&key).map(|k| k.into_owned()).unwrap_or(key.clone()),
            urlencoding::decode(&value).map(|v| v.into_owned()).unwrap_or(value.clone()),
        );
    }
    map
}

async fn write_response(
    stream: &mut TcpStream,
    method: &str,
    response: &MockResponse,
    cors: bool,
) -> Result<()> {
    let body = match response.body {
        Some(ref json) => serde_json::to_vec(json)?,
        None => Vec::new(),
    };

    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        http_status_text(response.status)
    );

    if response.body.is_some() {
        head.push_str("Content-Type: application/json; charset=utf-8\r\n");
    }
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("Connection: close\r\n");

    if cors {
        head.push_str("Access-Control-Allow-Origin: *\r\n");
        head.push_str("Access-Control-Allow-Methods: GET, POST, PUT, DELETE, PATCH, OPTIONS\r\n");
        head.push_str("Access-Control-Allow-Headers: *\r\n");
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await?;
    if !method.eq_ignore_ascii_case("HEAD") {
        stream.write_all(&body).await?;
    }
    stream.flush().await?;

    Ok(())
}

/// Get HTTP status text
fn http_status_text(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
