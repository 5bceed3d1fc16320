use mcp_common::ToolArgs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for resolving a browser link
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveLinkParams {
    #[schemars(description = "Browser URL of a Coda doc, page, table or other object")]
    pub url: String,
}

impl ToolArgs for ResolveLinkParams {}
