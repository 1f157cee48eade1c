//! [`Server`] – axum router and listener for the memory graph API.
//!
//! Listens on `0.0.0.0:8080` by default (configurable via
//! [`Server::with_port`] and [`Server::with_bind_address`]).  The same
//! routes answer on `/` and on [`MINDMAP_PATH`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{MethodRouter, get},
};
use lightmap_memory::{InMemoryStore, MemoryStore, MindMapService};
use lightmap_types::MindMapError;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{get_endpoint, method_not_allowed, post_endpoint};

/// Default TCP port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8080;

/// Path the API is mounted on besides `/`.
pub const MINDMAP_PATH: &str = "/api/memory/mindmap";

/// Largest accepted `POST` body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the API router over `service`.
pub fn router<S: MemoryStore + 'static>(service: Arc<MindMapService<S>>) -> Router {
    let endpoints = || -> MethodRouter<Arc<MindMapService<S>>> {
        get(get_endpoint::<S>)
            .post(post_endpoint::<S>)
            .fallback(method_not_allowed)
    };

    Router::new()
        .route("/", endpoints())
        .route(MINDMAP_PATH, endpoints())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP server over a shared [`MindMapService`].
pub struct Server<S: MemoryStore + 'static = InMemoryStore> {
    service: Arc<MindMapService<S>>,
    bind_address: IpAddr,
    port: u16,
}

impl<S: MemoryStore + 'static> Server<S> {
    /// Create a server for `service` on `0.0.0.0:`[`DEFAULT_PORT`].
    pub fn new(service: Arc<MindMapService<S>>) -> Self {
        Self {
            service,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the listening address (builder-style).
    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn bind_address(&self) -> IpAddr {
        self.bind_address
    }

    /// Bind the configured address and serve until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MindMapError::Io`] if the TCP listener cannot bind.
    pub async fn run(self) -> Result<(), MindMapError> {
        let addr = SocketAddr::new(self.bind_address, self.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| MindMapError::Io(format!("bind error on {addr}: {e}")))?;
        info!(%addr, "lightmap API listening");
        self.serve(listener).await
    }

    /// Serve requests from an already-bound `listener`.
    pub async fn serve(self, listener: TcpListener) -> Result<(), MindMapError> {
        axum::serve(listener, router(self.service))
            .await
            .map_err(|e| MindMapError::Io(format!("serve error: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use lightmap_encoder::LightEncoder;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tower::ServiceExt;

    fn make_service() -> Arc<MindMapService> {
        Arc::new(MindMapService::in_memory(Arc::new(LightEncoder::new())))
    }

    async fn spawn_server(service: Arc<MindMapService>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Server::new(service).serve(listener));
        addr
    }

    async fn send(addr: SocketAddr, raw: String) -> (u16, Value) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        let status: u16 = buf.split_whitespace().nth(1).unwrap().parse().unwrap();
        let body = buf.split("\r\n\r\n").nth(1).unwrap();
        (status, serde_json::from_str(body).unwrap())
    }

    fn post(body: &str) -> String {
        format!(
            "POST /api/memory/mindmap HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
    }

    async fn oneshot(request: Request<Body>) -> (StatusCode, Value) {
        let response = router(make_service()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_post(body: impl Into<Body>) -> Request<Body> {
        Request::post(MINDMAP_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    // ── constructor ──────────────────────────────────────────────────────────

    #[test]
    fn default_port_is_8080() {
        let server = Server::new(make_service());
        assert_eq!(server.port(), DEFAULT_PORT);
        assert_eq!(server.bind_address(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn builders_override_defaults() {
        let server = Server::new(make_service())
            .with_port(9999)
            .with_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(server.port(), 9999);
        assert_eq!(server.bind_address(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    // ── router ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn body_over_limit_is_413() {
        let oversized = vec![b' '; MAX_BODY_BYTES + 1];
        let (status, body) = oneshot(json_post(oversized)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn body_at_limit_is_decoded() {
        let mut padded = br#"{"action":"get_mindmap"}"#.to_vec();
        padded.resize(MAX_BODY_BYTES, b' ');
        let (status, body) = oneshot(json_post(padded)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalNodes"], 0);
    }

    #[tokio::test]
    async fn unparseable_body_is_500() {
        let (status, body) = oneshot(json_post("{not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], crate::handlers::OPERATION_FAILED);
    }

    #[tokio::test]
    async fn other_methods_are_405() {
        let request = Request::delete("/").body(Body::empty()).unwrap();
        let (status, body) = oneshot(request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body["error"].as_str().unwrap().contains("DELETE"));
    }

    #[tokio::test]
    async fn root_and_mindmap_path_both_answer() {
        for uri in ["/?format=graph", "/api/memory/mindmap?format=graph"] {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let (status, body) = oneshot(request).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["totalEdges"], 0);
        }
    }

    // ── over the wire ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn ingest_then_query_over_tcp() {
        let service = make_service();
        let addr = spawn_server(Arc::clone(&service)).await;

        let (status, body) = send(
            addr,
            post(r#"{"action":"add_memory","topic":"A","category":"x","content":"alpha beta gamma delta"}"#),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["totalMemories"], 1);

        let (status, body) = send(addr, post(r#"{"action":"find_connections","topic":"a"}"#)).await;
        assert_eq!(status, 200);
        assert_eq!(body["count"], 1);
        assert_eq!(service.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn bogus_action_over_tcp() {
        let service = make_service();
        let addr = spawn_server(Arc::clone(&service)).await;
        let (status, body) = send(addr, post(r#"{"action":"bogus"}"#)).await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
        assert_eq!(service.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn get_graph_over_tcp() {
        let addr = spawn_server(make_service()).await;
        let (status, body) = send(
            addr,
            "GET /?format=graph HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["totalNodes"], 0);
        assert_eq!(body["totalEdges"], 0);
    }
}
