//! Request handlers.
//!
//! | Request | Effect |
//! |---|---|
//! | `POST {action: "add_memory", content, topic?, category?, emotionalResonance?}` | Ingest one memory |
//! | `POST {action: "get_mindmap"}` | Category tree |
//! | `POST {action: "find_connections", topic}` | Substring query |
//! | `GET ?format=tree` (default) | Category tree |
//! | `GET ?format=graph` | Node/edge graph |
//! | `GET ?format=light` | Raw light payloads |
//! | `GET ?format=<other>` | Raw node array |
//!
//! [`handle_post`] and [`handle_get`] are synchronous and know nothing about
//! axum, which keeps them testable without a running server.  The async
//! `*_endpoint` functions at the bottom are thin extractor adapters.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use lightmap_memory::{MemoryStore, MindMapService, NewMemory};
use lightmap_types::MindMapError;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, warn};

pub const INVALID_ACTION: &str = "Invalid action. Use: add_memory, get_mindmap, find_connections";
pub const OPERATION_FAILED: &str = "Mind map operation failed";
pub const RETRIEVAL_FAILED: &str = "Failed to retrieve mind map";

/// Body of every `POST`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Option<String>,
    pub topic: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub emotional_resonance: Option<String>,
}

/// Query string of every `GET`.
#[derive(Debug, Default, Deserialize)]
pub struct FormatParams {
    pub format: Option<String>,
}

/// A validated `POST` action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddMemory(NewMemory),
    GetMindMap,
    FindConnections(String),
}

impl TryFrom<ActionRequest> for Action {
    type Error = MindMapError;

    fn try_from(req: ActionRequest) -> Result<Self, Self::Error> {
        match req.action.as_deref() {
            Some("add_memory") => {
                let content = req.content.ok_or(MindMapError::MissingField("content"))?;
                Ok(Action::AddMemory(NewMemory {
                    content,
                    topic: req.topic,
                    category: req.category,
                    resonance: req.emotional_resonance,
                }))
            }
            Some("get_mindmap") => Ok(Action::GetMindMap),
            Some("find_connections") => req.topic.map(Action::FindConnections).ok_or_else(|| {
                MindMapError::InvalidRequest("find_connections requires a topic".to_string())
            }),
            other => Err(MindMapError::InvalidAction(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON body with its status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// `{ "error": message }` with the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, MindMapError> {
    serde_json::to_value(value).map_err(|e| MindMapError::Io(format!("serialize: {e}")))
}

fn error_response(e: &MindMapError) -> ApiResponse {
    match e {
        MindMapError::InvalidAction(action) => {
            warn!(action = %action, "rejected unknown action");
            ApiResponse::error(StatusCode::BAD_REQUEST, INVALID_ACTION)
        }
        e if e.status() == 400 => {
            warn!(error = %e, "rejected request");
            ApiResponse::error(StatusCode::BAD_REQUEST, e.to_string())
        }
        e => {
            error!(error = %e, "mind map operation failed");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, OPERATION_FAILED)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synchronous core
// ─────────────────────────────────────────────────────────────────────────────

/// Run one validated action against the service.
pub fn execute<S: MemoryStore>(
    service: &MindMapService<S>,
    action: Action,
) -> Result<Value, MindMapError> {
    match action {
        Action::AddMemory(new) => {
            let added = service.add_memory(new)?;
            Ok(json!({
                "success": true,
                "memory": to_json(&added.memory)?,
                "totalMemories": added.total_memories,
            }))
        }
        Action::GetMindMap => to_json(&service.mind_map()?),
        Action::FindConnections(query) => {
            let connections = service.find_connections(&query)?;
            Ok(json!({
                "query": query,
                "count": connections.len(),
                "connections": to_json(&connections)?,
            }))
        }
    }
}

/// Handle a decoded `POST` body.
pub fn handle_post<S: MemoryStore>(
    service: &MindMapService<S>,
    request: ActionRequest,
) -> ApiResponse {
    match Action::try_from(request).and_then(|action| execute(service, action)) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => error_response(&e),
    }
}

/// Handle a `GET` for the given `format`.  An absent format means `tree`.
pub fn handle_get<S: MemoryStore>(
    service: &MindMapService<S>,
    format: Option<&str>,
) -> ApiResponse {
    let result = match format.unwrap_or("tree") {
        "tree" => service.mind_map().and_then(|m| to_json(&m)),
        "graph" => service.graph().and_then(|g| to_json(&g)),
        "light" => service.light().and_then(|l| to_json(&l)),
        _ => service.nodes().and_then(|n| to_json(&n)),
    };

    match result {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => {
            error!(error = %e, "mind map retrieval failed");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, RETRIEVAL_FAILED)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// axum adapters
// ─────────────────────────────────────────────────────────────────────────────

/// `POST` endpoint.  An oversized body keeps its 413; any other body that
/// fails to decode is an operation failure.
pub async fn post_endpoint<S: MemoryStore + 'static>(
    State(service): State<Arc<MindMapService<S>>>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResponse {
    match payload {
        Ok(Json(request)) => handle_post(&service, request),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(error = %rejection.body_text(), "request body too large");
            ApiResponse::error(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text())
        }
        Err(rejection) => {
            error!(error = %rejection.body_text(), "undecodable request body");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, OPERATION_FAILED)
        }
    }
}

/// `GET` endpoint.
pub async fn get_endpoint<S: MemoryStore + 'static>(
    State(service): State<Arc<MindMapService<S>>>,
    Query(params): Query<FormatParams>,
) -> ApiResponse {
    handle_get(&service, params.format.as_deref())
}

/// Any other method on an API path.
pub async fn method_not_allowed(method: Method) -> ApiResponse {
    ApiResponse::error(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} not allowed"),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use lightmap_encoder::LightEncoder;
    use lightmap_memory::InMemoryStore;
    use lightmap_types::MemoryNode;

    fn service() -> MindMapService<InMemoryStore> {
        MindMapService::in_memory(Arc::new(LightEncoder::new()))
    }

    fn post<S: MemoryStore>(s: &MindMapService<S>, body: Value) -> ApiResponse {
        handle_post(s, serde_json::from_value(body).unwrap())
    }

    fn add(s: &MindMapService<InMemoryStore>, topic: &str, category: &str, content: &str) -> Value {
        let r = post(
            s,
            json!({ "action": "add_memory", "topic": topic, "category": category, "content": content }),
        );
        assert_eq!(r.status, StatusCode::OK, "{}", r.body);
        r.body
    }

    // ── POST ─────────────────────────────────────────────────────────────────

    #[test]
    fn add_memory_returns_summary() {
        let s = service();
        let body = add(&s, "A", "x", "alpha beta gamma delta");
        assert_eq!(body["success"], true);
        assert_eq!(body["totalMemories"], 1);
        assert_eq!(body["memory"]["topic"], "A");
        assert_eq!(body["memory"]["connections"], 0);
        assert!(body["memory"]["serializedCode"].as_str().unwrap().starts_with("0x"));
        assert!(body["memory"]["lightVisualization"].is_string());
        assert!(body["memory"]["importance"].is_number());
    }

    #[test]
    fn related_scenario_over_http() {
        let s = service();
        let a = add(&s, "A", "x", "alpha beta gamma delta");
        let b = add(&s, "B", "x", "alpha beta gamma epsilon");
        let c = add(&s, "C", "y", "alpha beta gamma delta");
        assert_eq!(b["memory"]["connections"], 1);
        assert_eq!(c["memory"]["connections"], 0);

        let b_id = b["memory"]["id"].as_str().unwrap();
        let node = s.node(b_id).unwrap().unwrap();
        assert_eq!(node.connections, vec![a["memory"]["id"].as_str().unwrap().to_string()]);
    }

    #[test]
    fn missing_content_is_a_server_error_and_appends_nothing() {
        let s = service();
        let r = post(&s, json!({ "action": "add_memory", "topic": "A" }));
        assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(r.body["error"], OPERATION_FAILED);
        assert_eq!(s.len().unwrap(), 0);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let s = service();
        add(&s, "A", "x", "one");
        let r = post(&s, json!({ "action": "bogus" }));
        assert_eq!(r.status, StatusCode::BAD_REQUEST);
        assert_eq!(r.body["error"], INVALID_ACTION);
        assert_eq!(s.len().unwrap(), 1);
    }

    #[test]
    fn missing_action_is_rejected() {
        let r = post(&service(), json!({}));
        assert_eq!(r.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn get_mindmap_action() {
        let s = service();
        add(&s, "A", "science", "cells divide");
        add(&s, "B", "art", "paint dries");
        let r = post(&s, json!({ "action": "get_mindmap" }));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body["totalNodes"], 2);
        assert_eq!(r.body["categories"], json!(["science", "art"]));
        assert_eq!(r.body["root"]["id"], "root");
    }

    #[test]
    fn find_connections_round_trip() {
        let s = service();
        let added = add(&s, "Tide Pools", "nature", "anemones and crabs");
        let r = post(&s, json!({ "action": "find_connections", "topic": "Tide Pools" }));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body["query"], "Tide Pools");
        assert_eq!(r.body["count"], 1);
        assert_eq!(r.body["connections"][0]["id"], added["memory"]["id"]);
        assert!(r.body["connections"][0]["symbolicPreview"].is_array());
    }

    #[test]
    fn find_connections_without_topic_is_rejected() {
        let r = post(&service(), json!({ "action": "find_connections" }));
        assert_eq!(r.status, StatusCode::BAD_REQUEST);
        assert!(r.body["error"].as_str().unwrap().contains("topic"));
    }

    // ── GET ──────────────────────────────────────────────────────────────────

    #[test]
    fn graph_on_empty_store() {
        let r = handle_get(&service(), Some("graph"));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(
            r.body,
            json!({ "nodes": [], "edges": [], "totalNodes": 0, "totalEdges": 0 })
        );
    }

    #[test]
    fn graph_edges_follow_connections() {
        let s = service();
        add(&s, "A", "x", "alpha beta gamma delta");
        add(&s, "B", "x", "alpha beta gamma epsilon");
        let r = handle_get(&s, Some("graph"));
        assert_eq!(r.body["totalEdges"], 1);
        assert_eq!(r.body["edges"][0]["type"], "relates_to");
        assert!(r.body["nodes"][0]["codePreview"].as_str().unwrap().ends_with("..."));
    }

    #[test]
    fn absent_format_defaults_to_tree() {
        let r = handle_get(&service(), None);
        assert!(r.body["visualTree"].is_string());
    }

    #[test]
    fn light_format() {
        let s = service();
        add(&s, "A", "x", "divine truth");
        let r = handle_get(&s, Some("light"));
        assert_eq!(r.body["format"], "photonic");
        assert_eq!(r.body["total"], 1);
        assert_eq!(r.body["memories"][0]["colors"], json!(["Violet", "Blue"]));
        assert_eq!(r.body["memories"][0]["wavelengths"], json!([400, 470]));
    }

    #[test]
    fn unknown_format_returns_raw_nodes() {
        let s = service();
        add(&s, "A", "x", "one two");
        let r = handle_get(&s, Some("xml"));
        assert!(r.body.is_array());
        assert_eq!(r.body[0]["topic"], "A");
        assert!(r.body[0]["encodedPayload"].is_object());
    }

    // ── poisoned store ───────────────────────────────────────────────────────

    /// Store whose `append` panics while the write lock is held.
    struct PanickingStore;

    impl MemoryStore for PanickingStore {
        fn append(&mut self, _: MemoryNode) {
            panic!("store exploded mid-append");
        }
        fn nodes(&self) -> &[MemoryNode] {
            &[]
        }
        fn clear(&mut self) {}
    }

    fn poisoned() -> Arc<MindMapService<PanickingStore>> {
        let s = Arc::new(MindMapService::new(PanickingStore, Arc::new(LightEncoder::new())));
        let writer = Arc::clone(&s);
        let joined = std::thread::spawn(move || {
            writer.add_memory(NewMemory::new("first write"))
        })
        .join();
        assert!(joined.is_err());
        s
    }

    #[test]
    fn poisoned_store_fails_reads_with_retrieval_error() {
        let s = poisoned();
        for format in [Some("graph"), Some("tree"), Some("light"), None, Some("raw")] {
            let r = handle_get(&*s, format);
            assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR, "{format:?}");
            assert_eq!(r.body["error"], RETRIEVAL_FAILED);
        }
    }

    #[test]
    fn poisoned_store_fails_posts_with_operation_error() {
        let s = poisoned();
        let r = post(&*s, json!({ "action": "add_memory", "content": "second write" }));
        assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(r.body["error"], OPERATION_FAILED);

        let r = post(&*s, json!({ "action": "get_mindmap" }));
        assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ── IntoResponse ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn api_response_carries_status_and_json() {
        let response = ApiResponse::error(StatusCode::BAD_REQUEST, "nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "nope" }));
    }
}
