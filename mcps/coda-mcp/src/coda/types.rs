//! Coda API payloads
//!
//! Only the fields the tools reason about are typed; everything else the
//! API returns is kept in `extra` so payloads forwarded to the caller stay
//! complete.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page of documents from `GET /docs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocList {
    pub items: Vec<Doc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doc {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of pages from `GET /docs/{docId}/pages`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageList {
    pub items: Vec<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_link: Option<String>,
}

/// Page metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Acknowledgement of an accepted page mutation
///
/// Coda applies mutations asynchronously; `request_id` identifies the
/// queued write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReceipt {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Result of `GET /resolveBrowserLink`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLink {
    pub resource: LinkResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// A page to create with markdown canvas content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub name: String,
    pub content: String,
    pub parent_page_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertionMode {
    Replace,
    Append,
}

/// A page update: rename, content change, or both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUpdate {
    pub name: Option<String>,
    pub content: Option<(InsertionMode, String)>,
}

impl PageUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: None,
        }
    }

    pub fn content(mode: InsertionMode, markdown: impl Into<String>) -> Self {
        Self {
            name: None,
            content: Some((mode, markdown.into())),
        }
    }
}

// Wire shapes for request bodies and export polling

#[derive(Debug, Serialize)]
pub(crate) struct CanvasContent<'a> {
    pub format: &'static str,
    pub content: &'a str,
}

impl<'a> CanvasContent<'a> {
    pub fn markdown(content: &'a str) -> Self {
        Self {
            format: "markdown",
            content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageContentBody<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub canvas_content: CanvasContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePageBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<&'a str>,
    pub page_content: PageContentBody<'a>,
}

impl<'a> From<&'a NewPage> for CreatePageBody<'a> {
    fn from(page: &'a NewPage) -> Self {
        Self {
            name: &page.name,
            parent_page_id: page.parent_page_id.as_deref(),
            page_content: PageContentBody {
                kind: "canvas",
                canvas_content: CanvasContent::markdown(&page.content),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentUpdateBody<'a> {
    pub insertion_mode: InsertionMode,
    pub canvas_content: CanvasContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_update: Option<ContentUpdateBody<'a>>,
}

impl<'a> From<&'a PageUpdate> for UpdatePageBody<'a> {
    fn from(update: &'a PageUpdate) -> Self {
        Self {
            name: update.name.as_deref(),
            content_update: update
                .content
                .as_ref()
                .map(|(mode, markdown)| ContentUpdateBody {
                    insertion_mode: *mode,
                    canvas_content: CanvasContent::markdown(markdown),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum ExportState {
    InProgress,
    Complete,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportStatus {
    pub status: ExportState,
    #[serde(default)]
    pub download_link: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
