//! MCP Common - Shared plumbing for MCP servers
//!
//! This crate holds everything a tool server needs apart from its tools:
//!
//! - **Initialization**: [`init_tracing`] for stderr logging
//! - **Registry**: [`ToolRegistry`] with typed, validated tool arguments and
//!   [`with_error_envelope`] for uniform failure reporting
//! - **Results**: helpers that build the single-text-item result envelope
//! - **Protocol**: JSON-RPC request/response types and server identity
//! - **Sessions**: [`Session`] lifecycle, dispatch and correlation
//! - **Transport**: newline-delimited framing for stdio
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, Session, ServerIdentity, ToolRegistry};
//!
//! let registry = build_registry(client)?;
//! let identity = Arc::new(ServerIdentity::new("my-mcp", "0.1.0"));
//! serve_stdio(Session::new(registry, identity)).await?;
//! ```

pub mod error;
pub mod init;
pub mod protocol;
pub mod registry;
pub mod result;
pub mod session;
pub mod transport;

// Re-export commonly used items at crate root
pub use error::{McpError, McpResult, TransportError};
pub use init::init_tracing;
pub use protocol::{JsonRpcRequest, JsonRpcResponse, RequestId, ServerIdentity};
pub use registry::{with_error_envelope, RegistryError, ToolArgs, ToolInvocation, ToolRegistry};
pub use result::{error_result, first_text, is_error, json_text, text_success};
pub use session::{
    Session, SessionChannel, SessionState, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_IN_FLIGHT,
};
pub use transport::{serve_lines, serve_stdio};

// Re-export rmcp types that are commonly needed
pub use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
