//! Handler implementations for Coda MCP tools
//!
//! Organized by domain: document, page, content, link. Each handler takes
//! the shared client and its typed parameters and returns the text of a
//! successful result; the registry wraps failures in the error envelope.

mod content;
mod document;
mod link;
mod page;

pub use content::*;
pub use document::*;
pub use link::*;
pub use page::*;

use thiserror::Error;

use crate::coda::CodaError;

/// Failures a tool handler can report
#[derive(Debug, Error)]
pub enum ToolError {
    /// The Coda API rejected the call or could not be reached
    #[error(transparent)]
    Remote(#[from] CodaError),

    /// A content export yielded nothing usable
    #[error("Unknown error has occurred")]
    ContentUnavailable,

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type HandlerResult<T> = Result<T, ToolError>;
