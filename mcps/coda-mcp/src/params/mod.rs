//! Parameter types for Coda MCP tools
//!
//! Field names are camelCase on the wire (`docId`, `pageIdOrName`, ...).

mod document;
mod link;
mod page;

pub use document::*;
pub use link::*;
pub use page::*;

/// Check that an optional count is a positive integer that fits in `u32`
pub(crate) fn positive(field: &str, value: i64) -> Result<(), String> {
    if value <= 0 {
        return Err(format!("{} must be a positive integer, got {}", field, value));
    }
    if value > i64::from(u32::MAX) {
        return Err(format!("{} is too large: {}", field, value));
    }
    Ok(())
}
