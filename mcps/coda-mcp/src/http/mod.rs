//! HTTP entry points
//!
//! Two routers share one [`AppState`]:
//! - [`sse::router`]: long-running server, one session per SSE stream
//! - [`serverless::router`]: one fresh session per POSTed message
//!
//! Both answer health checks without touching a registry and both put
//! their channel endpoints behind the optional `?token=` gate.

pub mod auth;
pub mod health;
pub mod serverless;
pub mod sse;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use mcp_common::{ServerIdentity, Session, ToolRegistry};
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::coda::SharedClient;
use crate::server::build_registry;

/// Inbound frame senders of live SSE sessions, by session id
pub type SessionMap = Arc<RwLock<HashMap<String, mpsc::Sender<String>>>>;

/// State shared by every request of one HTTP server
#[derive(Clone)]
pub struct AppState {
    pub client: SharedClient,
    pub identity: Arc<ServerIdentity>,
    /// Expected `?token=` value; `None` leaves the endpoints open
    pub auth_token: Option<Arc<str>>,
    pub sessions: SessionMap,
}

impl AppState {
    pub fn new(client: SharedClient, identity: ServerIdentity, auth_token: Option<String>) -> Self {
        Self {
            client,
            identity: Arc::new(identity),
            auth_token: auth_token.map(Arc::from),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A new session with its own registry
    pub fn new_session(&self) -> Result<Session, mcp_common::RegistryError> {
        let registry: ToolRegistry = build_registry(Arc::clone(&self.client))?;
        Ok(Session::new(registry, Arc::clone(&self.identity)))
    }

    pub fn log_auth_mode(&self) {
        if self.auth_token.is_some() {
            tracing::info!("Token auth enabled for channel endpoints");
        } else {
            tracing::warn!(
                "MCP_AUTH_TOKEN is not set; channel endpoints accept unauthenticated requests"
            );
        }
    }
}

fn with_common_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve `app` until Ctrl-C
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
