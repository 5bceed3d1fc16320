//! Coda MCP Server
//!
//! Exposes Coda documents, pages and page content as MCP tools.
//!
//! # Tools
//! - Documents: list/search
//! - Pages: list, create, get, duplicate, rename
//! - Content: get as markdown, replace, append, peek
//! - Links: resolve a browser URL
//!
//! # Transports
//! - stdio: newline-delimited JSON-RPC for local clients
//! - http: SSE stream plus `POST /message`, one session per stream
//! - serverless: `POST /mcp`, one session per request
//!
//! # Requirements
//! - `CODA_API_KEY` set to a Coda API token

pub mod coda;
pub mod config;
pub mod handlers;
pub mod http;
pub mod params;
pub mod server;

pub use coda::{CodaClient, DocClient, SharedClient};
pub use config::Config;
pub use server::build_registry;
