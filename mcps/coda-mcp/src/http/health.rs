//! Health endpoints; answered without creating a session

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub server: String,
    pub version: String,
    pub sessions: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server: state.identity.name.clone(),
        version: state.identity.version.clone(),
        sessions: state.sessions.read().await.len(),
    })
}
