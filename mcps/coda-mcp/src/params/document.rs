//! Document-related parameter types

use mcp_common::ToolArgs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for listing documents
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsParams {
    #[schemars(description = "Search term to filter documents by name")]
    pub query: Option<String>,
}

impl ToolArgs for ListDocumentsParams {}
