//! Long-running HTTP transport
//!
//! `GET /sse` opens a session and streams its replies. The first event is
//! `endpoint`, whose data is the URL to POST messages to
//! (`/message?sessionId=<id>`). Each reply is sent as a `message` event.
//! Dropping the stream closes the session.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Router,
};
use futures_util::Stream;
use mcp_common::{Session, SessionChannel, DEFAULT_CHANNEL_CAPACITY};
use serde::Deserialize;

use super::{auth, health, with_common_layers, AppState, SessionMap};

pub fn router(state: AppState) -> Router {
    let channel = Router::new()
        .route("/sse", get(open_stream))
        .route("/message", post(post_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/healthz", get(health::health))
        .merge(channel)
        .with_state(state);

    with_common_layers(app)
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Closes the session and forgets it when the SSE stream is dropped
struct SessionGuard {
    session: Session,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.close();

        let id = self.session.id().to_string();
        let sessions = Arc::clone(&self.sessions);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                sessions.write().await.remove(&id);
                tracing::info!(session_id = %id, "SSE session closed");
            });
        }
    }
}

async fn open_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let session = state.new_session().map_err(|e| {
        tracing::error!("Failed to build tool registry: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let SessionChannel {
        session,
        inbound,
        mut outbound,
    } = session.spawn(DEFAULT_CHANNEL_CAPACITY);

    let session_id = session.id().to_string();
    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), inbound);
    tracing::info!(session_id = %session_id, "SSE session opened");

    let endpoint = endpoint_url(&session_id, query.token.as_deref());
    let guard = SessionGuard {
        session,
        sessions: Arc::clone(&state.sessions),
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(frame) = outbound.recv().await {
            yield Ok::<_, Infallible>(Event::default().event("message").data(frame));
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// Accept one client frame for an open session
///
/// Replies are delivered on the session's stream, so the POST itself is
/// answered with `202 Accepted`.
async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> StatusCode {
    let sender = state.sessions.read().await.get(&query.session_id).cloned();
    let Some(sender) = sender else {
        tracing::debug!(session_id = %query.session_id, "message for unknown session");
        return StatusCode::NOT_FOUND;
    };

    match sender.send(body).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            state.sessions.write().await.remove(&query.session_id);
            tracing::debug!(session_id = %query.session_id, "message for closed session");
            StatusCode::GONE
        }
    }
}

fn endpoint_url(session_id: &str, token: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("sessionId", session_id);
    if let Some(token) = token {
        query.append_pair("token", token);
    }
    format!("/message?{}", query.finish())
}
