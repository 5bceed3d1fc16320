//! Page content handlers

use super::{HandlerResult, ToolError};
use crate::coda::{InsertionMode, PageUpdate, SharedClient};
use crate::params::{PageContentParams, PageRefParams, PeekPageParams};
use mcp_common::json_text;

/// Export a page's markdown, treating an empty export as a failure
pub(crate) async fn fetch_content(
    client: &SharedClient,
    doc_id: &str,
    page: &str,
) -> HandlerResult<String> {
    client
        .page_content(doc_id, page)
        .await?
        .ok_or(ToolError::ContentUnavailable)
}

/// First `count` lines of `content`, accepting `\n` and `\r\n` endings
pub fn first_lines(content: &str, count: usize) -> String {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .take(count)
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn get_page_content(client: SharedClient, params: PageRefParams) -> HandlerResult<String> {
    fetch_content(&client, &params.doc_id, &params.page_id_or_name).await
}

pub async fn replace_page_content(
    client: SharedClient,
    params: PageContentParams,
) -> HandlerResult<String> {
    update_content(client, params, InsertionMode::Replace).await
}

pub async fn append_page_content(
    client: SharedClient,
    params: PageContentParams,
) -> HandlerResult<String> {
    update_content(client, params, InsertionMode::Append).await
}

async fn update_content(
    client: SharedClient,
    params: PageContentParams,
    mode: InsertionMode,
) -> HandlerResult<String> {
    let receipt = client
        .update_page(
            &params.doc_id,
            &params.page_id_or_name,
            &PageUpdate::content(mode, params.content),
        )
        .await?;
    Ok(json_text(&receipt)?)
}

pub async fn peek_page(client: SharedClient, params: PeekPageParams) -> HandlerResult<String> {
    let content = fetch_content(&client, &params.doc_id, &params.page_id_or_name).await?;
    Ok(first_lines(&content, params.line_count()))
}
