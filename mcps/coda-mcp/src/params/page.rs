//! Page-related parameter types

use mcp_common::ToolArgs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::positive;

/// Page size used when neither a limit nor a page token is given
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Parameters for listing pages
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPagesParams {
    #[schemars(description = "The ID of the document")]
    pub doc_id: String,

    #[schemars(description = "Maximum number of pages to return (default 25). Ignored when nextPageToken is set")]
    #[schemars(range(min = 1))]
    pub limit: Option<i64>,

    #[schemars(description = "Token from a previous response to fetch the next page of results")]
    pub next_page_token: Option<String>,
}

impl ListPagesParams {
    /// Limit and token to send; a token takes precedence over any limit
    pub fn pagination(&self) -> (Option<u32>, Option<&str>) {
        match self.next_page_token.as_deref() {
            Some(token) => (None, Some(token)),
            None => {
                let limit = self
                    .limit
                    .and_then(|l| u32::try_from(l).ok())
                    .unwrap_or(DEFAULT_PAGE_LIMIT);
                (Some(limit), None)
            }
        }
    }
}

impl ToolArgs for ListPagesParams {
    fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(limit) => positive("limit", limit),
            None => Ok(()),
        }
    }
}

/// Parameters for creating a page
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageParams {
    #[schemars(description = "The ID of the document to create the page in")]
    pub doc_id: String,

    #[schemars(description = "Name of the new page")]
    pub name: String,

    #[schemars(description = "Markdown content for the page")]
    pub content: Option<String>,

    #[schemars(description = "ID of the parent page to nest the new page under")]
    pub parent_page_id: Option<String>,
}

impl ToolArgs for CreatePageParams {}

/// Parameters addressing a single page
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRefParams {
    #[schemars(description = "The ID of the document")]
    pub doc_id: String,

    #[schemars(description = "The ID or name of the page")]
    pub page_id_or_name: String,
}

impl ToolArgs for PageRefParams {}

/// Parameters for replacing or appending page content
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageContentParams {
    #[schemars(description = "The ID of the document")]
    pub doc_id: String,

    #[schemars(description = "The ID or name of the page")]
    pub page_id_or_name: String,

    #[schemars(description = "Markdown content")]
    pub content: String,
}

impl ToolArgs for PageContentParams {}

/// Parameters for copying or renaming a page
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewNameParams {
    #[schemars(description = "The ID of the document")]
    pub doc_id: String,

    #[schemars(description = "The ID or name of the page")]
    pub page_id_or_name: String,

    #[schemars(description = "The new page name")]
    pub new_name: String,
}

impl ToolArgs for NewNameParams {}

/// Parameters for previewing the first lines of a page
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeekPageParams {
    #[schemars(description = "The ID of the document")]
    pub doc_id: String,

    #[schemars(description = "The ID or name of the page")]
    pub page_id_or_name: String,

    #[schemars(description = "Number of lines to return")]
    #[schemars(range(min = 1))]
    pub num_lines: i64,
}

impl PeekPageParams {
    pub fn line_count(&self) -> usize {
        usize::try_from(self.num_lines).unwrap_or(0)
    }
}

impl ToolArgs for PeekPageParams {
    fn validate(&self) -> Result<(), String> {
        positive("numLines", self.num_lines)
    }
}
