//! Shared-secret gate for channel endpoints
//!
//! Requests must carry `?token=<value>` matching `MCP_AUTH_TOKEN`. When no
//! token is configured every request is allowed; the server logs a warning
//! at startup in that case.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Value of the `token` query parameter, if present
pub fn query_token(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

/// Token middleware, used with `middleware::from_fn_with_state`
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.auth_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    match query_token(request.uri().query()) {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid token provided for {}", request.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing token for {}", request.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
