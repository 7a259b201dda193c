//! HTTP transport.
//!
//! - `POST <path>` carries one JSON-RPC message per request
//! - `GET /health` is a liveness probe
//! - `GET /ready` reports tool count and cache statistics

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::rpc::{JsonRpcRequest, handle_request};
use crate::tools::{McpTool, ToolContext};

/// Default JSON-RPC endpoint path.
pub const DEFAULT_MCP_PATH: &str = "/mcp";

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub ctx: ToolContext,
}

/// Create the HTTP router for MCP.
pub fn create_router(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext, path: &str) -> Router {
    let state = Arc::new(HttpState { tools, ctx });
    let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route(&path, post(handle_mcp_post))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "clinical-trials-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let cache = state.ctx.client.gateway().cache().stats().await;
    Json(serde_json::json!({
        "status": "ready",
        "service": "clinical-trials-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.tools.len(),
        "cache": cache
    }))
}

async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<JsonRpcRequest>,
) -> Response {
    match handle_request(&req, &state.tools, &state.ctx).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
