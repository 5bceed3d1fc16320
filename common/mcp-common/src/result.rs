//! Result envelope helpers
//!
//! Every tool call in these servers answers with exactly one text content
//! item. Success and handled failure differ only in the `isError` flag, so
//! the helpers here are the only places that build a [`CallToolResult`].

use rmcp::model::{CallToolResult, Content, RawContent};
use serde::Serialize;

/// Create a successful plain text result
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Create a handled-failure result carrying a human-readable diagnostic
///
/// This is not a protocol error: the call completed and the caller sees the
/// message as tool output with `isError: true`.
pub fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Serialize any payload as pretty-printed JSON text
///
/// Handlers that forward a remote payload use this to produce the text of
/// their single content item.
pub fn json_text<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Whether a result is a handled failure
pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}

/// The text of the first text content item, if any
pub fn first_text(result: &CallToolResult) -> Option<&str> {
    result.content.iter().find_map(|c| match &c.raw {
        RawContent::Text(t) => Some(t.text.as_str()),
        _ => None,
    })
}
