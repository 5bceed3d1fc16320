//! Serverless entry point
//!
//! Every POST carries one JSON-RPC message and gets a session and registry
//! of its own, which are discarded with the response. Nothing survives
//! between requests.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mcp_common::JsonRpcRequest;

use super::{auth, health, with_common_layers, AppState};

pub fn router(state: AppState) -> Router {
    let channel = Router::new()
        .route("/mcp", post(handle_message))
        .route("/", post(handle_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/healthz", get(health::health))
        .route("/api/health", get(health::health))
        .merge(channel)
        .with_state(state);

    with_common_layers(app)
}

/// Answer one message with a throwaway session
///
/// Requests get `200` with the JSON-RPC response, notifications `202`, and
/// bodies that are not JSON-RPC messages `400`.
pub async fn handle_message(State(state): State<AppState>, body: String) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected malformed message: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid JSON-RPC message: {}", e),
            )
                .into_response();
        }
    };

    let session = match state.new_session() {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to build tool registry: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    session.open();
    let reply = session.handle_request(request).await;
    session.close();

    match reply {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
