use mcp_common::json_text;

use super::HandlerResult;
use crate::coda::SharedClient;
use crate::params::ResolveLinkParams;

pub async fn resolve_link(client: SharedClient, params: ResolveLinkParams) -> HandlerResult<String> {
    let resolved = client.resolve_link(&params.url).await?;
    Ok(json_text(&resolved)?)
}
