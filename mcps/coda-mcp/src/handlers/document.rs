use mcp_common::json_text;

use super::HandlerResult;
use crate::coda::SharedClient;
use crate::params::ListDocumentsParams;

pub async fn list_documents(
    client: SharedClient,
    params: ListDocumentsParams,
) -> HandlerResult<String> {
    let docs = client.list_documents(params.query.as_deref()).await?;
    Ok(json_text(&docs)?)
}
