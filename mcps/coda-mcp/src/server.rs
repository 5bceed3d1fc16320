//! Tool registry for the Coda MCP server
//!
//! [`build_registry`] is the single place tools are declared. Every
//! transport calls it once per session with the process-wide client, so
//! sessions never share a registry. Handler implementations are in the
//! handlers/ module.

use std::future::Future;
use std::sync::Arc;

use mcp_common::{with_error_envelope, RegistryError, ServerIdentity, ToolRegistry};

use crate::coda::SharedClient;
use crate::handlers;

pub const SERVER_NAME: &str = "coda-mcp";

pub fn identity() -> ServerIdentity {
    ServerIdentity::new(SERVER_NAME, env!("CARGO_PKG_VERSION")).with_instructions(
        "Coda MCP Server - provides tools for listing Coda documents and pages, \
         reading page content as markdown, and creating, renaming, duplicating \
         and editing pages. Pages can be addressed by ID or by name.",
    )
}

/// Build a fresh tool registry bound to `client`
pub fn build_registry(client: SharedClient) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    // ========================================================================
    // Documents
    // ========================================================================

    registry.register(
        "list_documents",
        "List or search available documents",
        with_error_envelope("list documents", bind(&client, handlers::list_documents)),
    )?;

    // ========================================================================
    // Pages
    // ========================================================================

    registry
        .register(
            "list_pages",
            "List pages in a document with pagination support",
            with_error_envelope("list pages", bind(&client, handlers::list_pages)),
        )?
        .register(
            "create_page",
            "Create a new page in a document",
            with_error_envelope("create page", bind(&client, handlers::create_page)),
        )?
        .register(
            "get_page",
            "Get metadata for a page (name, ID, browser link, parent)",
            with_error_envelope("get page", bind(&client, handlers::get_page)),
        )?
        .register(
            "duplicate_page",
            "Duplicate an existing page with a new name",
            with_error_envelope("duplicate page", bind(&client, handlers::duplicate_page)),
        )?
        .register(
            "rename_page",
            "Rename an existing page",
            with_error_envelope("rename page", bind(&client, handlers::rename_page)),
        )?;

    // ========================================================================
    // Content
    // ========================================================================

    registry
        .register(
            "get_page_content",
            "Get the content of a page as markdown",
            with_error_envelope("get page content", bind(&client, handlers::get_page_content)),
        )?
        .register(
            "replace_page_content",
            "Replace the content of a page with new markdown content",
            with_error_envelope(
                "replace page content",
                bind(&client, handlers::replace_page_content),
            ),
        )?
        .register(
            "append_page_content",
            "Append new markdown content to the end of a page",
            with_error_envelope(
                "append page content",
                bind(&client, handlers::append_page_content),
            ),
        )?
        .register(
            "peek_page",
            "Peek into the beginning of a page and return a limited number of lines",
            with_error_envelope("peek page", bind(&client, handlers::peek_page)),
        )?;

    // ========================================================================
    // Links
    // ========================================================================

    registry.register(
        "resolve_link",
        "Resolve metadata given a browser link to a Coda object",
        with_error_envelope("resolve link", bind(&client, handlers::resolve_link)),
    )?;

    Ok(registry)
}

/// Close a handler over its own handle to the shared client
fn bind<A, F, Fut>(client: &SharedClient, handler: F) -> impl Fn(A) -> Fut + Send + Sync + 'static
where
    F: Fn(SharedClient, A) -> Fut + Send + Sync + 'static,
    Fut: Future,
{
    let client = Arc::clone(client);
    move |args: A| handler(Arc::clone(&client), args)
}
