//! Page metadata handlers

use mcp_common::json_text;
use tracing::debug;

use super::{fetch_content, HandlerResult};
use crate::coda::{NewPage, PageUpdate, SharedClient};
use crate::params::{CreatePageParams, ListPagesParams, NewNameParams, PageRefParams};

/// Content sent for pages created without any; Coda rejects empty canvases
pub const EMPTY_PAGE_CONTENT: &str = " ";

fn non_empty(content: Option<String>) -> String {
    content
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| EMPTY_PAGE_CONTENT.to_string())
}

pub async fn list_pages(client: SharedClient, params: ListPagesParams) -> HandlerResult<String> {
    let (limit, page_token) = params.pagination();
    let pages = client.list_pages(&params.doc_id, limit, page_token).await?;
    Ok(json_text(&pages)?)
}

pub async fn create_page(client: SharedClient, params: CreatePageParams) -> HandlerResult<String> {
    let page = NewPage {
        name: params.name,
        content: non_empty(params.content),
        parent_page_id: params.parent_page_id,
    };
    let receipt = client.create_page(&params.doc_id, &page).await?;
    Ok(json_text(&receipt)?)
}

pub async fn get_page(client: SharedClient, params: PageRefParams) -> HandlerResult<String> {
    let page = client.get_page(&params.doc_id, &params.page_id_or_name).await?;
    Ok(json_text(&page)?)
}

/// Copy a page's content into a new page
///
/// The copy is created only after the content read succeeds.
pub async fn duplicate_page(client: SharedClient, params: NewNameParams) -> HandlerResult<String> {
    let content = fetch_content(&client, &params.doc_id, &params.page_id_or_name).await?;
    debug!(
        doc_id = %params.doc_id,
        source = %params.page_id_or_name,
        bytes = content.len(),
        "duplicating page"
    );

    let page = NewPage {
        name: params.new_name,
        content: non_empty(Some(content)),
        parent_page_id: None,
    };
    let receipt = client.create_page(&params.doc_id, &page).await?;
    Ok(json_text(&receipt)?)
}

pub async fn rename_page(client: SharedClient, params: NewNameParams) -> HandlerResult<String> {
    let receipt = client
        .update_page(
            &params.doc_id,
            &params.page_id_or_name,
            &PageUpdate::rename(params.new_name),
        )
        .await?;
    Ok(json_text(&receipt)?)
}
