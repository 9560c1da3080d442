//! HTTP endpoint wrapping the checker
//!
//! Architecture: Adapter Layer - the service is thin plumbing over the analyzer
//! - tiny_http accepts connections on a blocking thread; each request becomes a tokio task
//! - Every check runs on the blocking pool under a deadline and parses its own tree
//! - Nothing is shared between requests except the immutable analyzer

use crate::analyzer::Analyzer;
use crate::config::ServerConfig;
use crate::domain::violations::{CheckRequest, CheckResponse, CheckerError, CheckerResult};
use serde_json::{json, Value as JsonValue};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};
use uuid::Uuid;

/// Path of the checking endpoint
pub const CHECK_PATH: &str = "/check-accessibility";

/// Plain view of an HTTP request, detached from the connection
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    /// Request target, query string included
    pub url: String,
    pub origin: Option<String>,
    /// Value of `Access-Control-Request-Headers` on preflight requests
    pub requested_headers: Option<String>,
    pub body: Vec<u8>,
}

impl IncomingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), origin: None, requested_headers: None, body: Vec::new() }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Path without query string
    fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    /// Read a tiny_http request, keeping at most `max_body_bytes + 1` bytes of body
    fn read_from(request: &mut tiny_http::Request, max_body_bytes: usize) -> std::io::Result<Self> {
        let header = |name: &str| {
            request
                .headers()
                .iter()
                .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
                .map(|h| h.value.as_str().to_string())
        };
        let origin = header("Origin");
        let requested_headers = header("Access-Control-Request-Headers");

        let mut body = Vec::new();
        let limit = u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(1);
        request.as_reader().take(limit).read_to_end(&mut body)?;

        Ok(Self {
            method: request.method().clone(),
            url: request.url().to_string(),
            origin,
            requested_headers,
            body,
        })
    }
}

/// Response produced by the router
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; `Null` means no body
    pub body: JsonValue,
    pub headers: Vec<(&'static str, String)>,
}

impl ApiResponse {
    fn json(status: u16, body: JsonValue) -> Self {
        Self { status, body, headers: vec![("Content-Type", "application/json".to_string())] }
    }

    fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self::json(status, json!({ "detail": detail.into() }))
    }

    fn no_content() -> Self {
        Self { status: 204, body: JsonValue::Null, headers: Vec::new() }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn into_tiny(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let body = if self.body.is_null() { String::new() } else { self.body.to_string() };
        let mut response = Response::from_string(body).with_status_code(self.status);

        for (name, value) in &self.headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => tracing::warn!("Dropping invalid header {}: {}", name, value),
            }
        }

        response
    }
}

/// Maps requests to responses
pub struct Router {
    analyzer: Arc<Analyzer>,
    settings: ServerConfig,
}

impl Router {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        let settings = analyzer.config().server.clone();
        Self { analyzer, settings }
    }

    /// Handle one request
    pub async fn route(&self, request: IncomingRequest) -> ApiResponse {
        let request_id = Uuid::new_v4();

        let mut response = match (&request.method, request.path()) {
            (Method::Options, _) => self.preflight(&request),
            (Method::Get, "/") => {
                ApiResponse::json(200, json!({ "message": "ADA Compliance Checker API" }))
            }
            (Method::Get, "/health") => ApiResponse::json(200, json!({ "status": "healthy" })),
            (Method::Post, CHECK_PATH) => self.check(&request.body, request_id).await,
            (_, "/" | "/health" | CHECK_PATH) => ApiResponse::detail(405, "Method Not Allowed"),
            _ => ApiResponse::detail(404, "Not Found"),
        };

        self.apply_cors(&request, &mut response);

        tracing::info!(
            request_id = %request_id,
            method = %request.method,
            path = request.path(),
            status = response.status,
            "Handled request"
        );

        response
    }

    async fn check(&self, body: &[u8], request_id: Uuid) -> ApiResponse {
        if body.len() > self.settings.max_body_bytes {
            return ApiResponse::detail(
                413,
                format!("Request body exceeds {} bytes", self.settings.max_body_bytes),
            );
        }

        let request: CheckRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return ApiResponse::detail(400, format!("Error processing HTML: {e}")),
        };

        let analyzer = Arc::clone(&self.analyzer);
        let deadline = Duration::from_millis(self.settings.request_timeout_ms);
        let task = tokio::task::spawn_blocking(move || analyzer.analyze_html(&request.html));

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(Ok(violations))) => {
                tracing::debug!(request_id = %request_id, "Found {} violations", violations.len());
                match serde_json::to_value(CheckResponse { violations }) {
                    Ok(body) => ApiResponse::json(200, body),
                    Err(e) => ApiResponse::detail(500, format!("Failed to encode response: {e}")),
                }
            }
            Ok(Ok(Err(e))) => ApiResponse::detail(400, format!("Error processing HTML: {e}")),
            Ok(Err(e)) => {
                tracing::error!(request_id = %request_id, "Check task failed: {}", e);
                ApiResponse::detail(500, "Internal Server Error")
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    "Check exceeded {}ms",
                    self.settings.request_timeout_ms
                );
                ApiResponse::detail(503, "Request timed out")
            }
        }
    }

    fn preflight(&self, request: &IncomingRequest) -> ApiResponse {
        let mut response = ApiResponse::no_content();
        if self.allowed_origin(request).is_some() {
            response.headers.push((
                "Access-Control-Allow-Methods",
                "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT".to_string(),
            ));
            response.headers.push((
                "Access-Control-Allow-Headers",
                request.requested_headers.clone().unwrap_or_else(|| "*".to_string()),
            ));
            response.headers.push(("Access-Control-Max-Age", "600".to_string()));
        }
        response
    }

    fn allowed_origin<'r>(&self, request: &'r IncomingRequest) -> Option<&'r str> {
        request
            .origin
            .as_deref()
            .filter(|origin| self.settings.allowed_origins.iter().any(|o| o == origin))
    }

    fn apply_cors(&self, request: &IncomingRequest, response: &mut ApiResponse) {
        if let Some(origin) = self.allowed_origin(request) {
            response.headers.push(("Access-Control-Allow-Origin", origin.to_string()));
            response.headers.push(("Access-Control-Allow-Credentials", "true".to_string()));
            response.headers.push(("Vary", "Origin".to_string()));
        }
    }
}

/// Serve until the listener shuts down
pub async fn serve(analyzer: Analyzer, bind: Option<&str>) -> CheckerResult<()> {
    let bind = bind.map(str::to_string).unwrap_or_else(|| analyzer.config().server.bind.clone());

    let server = Server::http(&bind)
        .map_err(|e| CheckerError::server(format!("Failed to bind {bind}: {e}")))?;
    let router = Arc::new(Router::new(Arc::new(analyzer)));
    let handle = tokio::runtime::Handle::current();

    tracing::info!("Serving accessibility checks on http://{}", bind);

    tokio::task::spawn_blocking(move || {
        for request in server.incoming_requests() {
            handle.spawn(handle_connection(Arc::clone(&router), request));
        }
    })
    .await
    .map_err(|e| CheckerError::server(format!("Listener stopped unexpectedly: {e}")))?;

    Ok(())
}

async fn handle_connection(router: Arc<Router>, mut request: tiny_http::Request) {
    let max_body_bytes = router.settings.max_body_bytes;

    let read = tokio::task::spawn_blocking(move || {
        let incoming = IncomingRequest::read_from(&mut request, max_body_bytes);
        (request, incoming)
    })
    .await;

    let (request, incoming) = match read {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to read request: {}", e);
            return;
        }
    };

    let response = match incoming {
        Ok(incoming) => router.route(incoming).await,
        Err(e) => ApiResponse::detail(400, format!("Failed to read request body: {e}")),
    };

    let written = tokio::task::spawn_blocking(move || request.respond(response.into_tiny())).await;
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Failed to write response: {}", e),
        Err(e) => tracing::error!("Response task failed: {}", e),
    }
}
