//! Error types for the protocol layer
//!
//! Tool failures never surface here: they are folded into `isError`
//! results by the registry. What remains are JSON-RPC level errors (unknown
//! method, malformed params) and transport faults that end a session.

use rmcp::model::ErrorCode;
pub use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Type alias for protocol-level results
pub type McpResult<T> = Result<T, McpError>;

/// Faults on the channel underneath a session
///
/// These are never reported to the client; the channel is gone or unusable.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from or writing to the underlying stream failed
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session stopped accepting frames
    #[error("session {0} is closed")]
    Closed(String),
}

/// JSON-RPC `-32600`
pub fn invalid_request(message: impl Into<String>) -> McpError {
    McpError::new(ErrorCode::INVALID_REQUEST, message.into(), None)
}

/// JSON-RPC `-32601`
pub fn method_not_found(method: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("method not found: {}", method),
        None,
    )
}

/// JSON-RPC `-32602`
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// JSON-RPC `-32603`
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}
