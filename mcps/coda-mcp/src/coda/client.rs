//! HTTPS implementation of [`DocClient`] against the Coda v1 API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::error::{CodaError, CodaResult};
use super::types::{
    CreatePageBody, DocList, ExportRequest, ExportState, ExportStatus, NewPage, Page, PageList,
    PageReceipt, PageUpdate, ResolvedLink, UpdatePageBody,
};
use super::DocClient;
use crate::config::CodaConfig;

/// Coda API client
///
/// Every request carries the bearer token and the configured timeout.
/// Export downloads go to pre-signed links and are sent without the token.
pub struct CodaClient {
    http: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
    export_poll_interval: Duration,
    export_max_attempts: u32,
}

impl CodaClient {
    pub fn new(config: &CodaConfig) -> CodaResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| CodaError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CodaError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .user_agent(concat!("coda-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            timeout: config.request_timeout(),
            export_poll_interval: config.export_poll_interval(),
            export_max_attempts: config.export_max_attempts,
        })
    }

    /// Build an API URL; each segment is percent-encoded on its own
    fn endpoint(&self, segments: &[&str]) -> CodaResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CodaError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn page_url(&self, doc_id: &str, page: &str, rest: &[&str]) -> CodaResult<Url> {
        let mut segments = vec!["docs", doc_id, "pages", page];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CodaResult<T> {
        let body = self.execute(request.bearer_auth(&self.api_key)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: RequestBuilder) -> CodaResult<String> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            debug!(%status, "Coda API error response");
            return Err(CodaError::Status {
                status,
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> CodaError {
        if err.is_timeout() {
            CodaError::Timeout(self.timeout)
        } else {
            CodaError::Http(err)
        }
    }

    async fn download(&self, link: &str) -> CodaResult<String> {
        self.execute(self.http.get(link)).await
    }
}

#[async_trait]
impl DocClient for CodaClient {
    async fn list_documents(&self, query: Option<&str>) -> CodaResult<DocList> {
        let mut request = self.http.get(self.endpoint(&["docs"])?);
        if let Some(query) = query {
            request = request.query(&[("query", query)]);
        }
        self.send(request).await
    }

    async fn list_pages(
        &self,
        doc_id: &str,
        limit: Option<u32>,
        page_token: Option<&str>,
    ) -> CodaResult<PageList> {
        let mut request = self.http.get(self.endpoint(&["docs", doc_id, "pages"])?);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        self.send(request).await
    }

    async fn create_page(&self, doc_id: &str, page: &NewPage) -> CodaResult<PageReceipt> {
        let request = self
            .http
            .post(self.endpoint(&["docs", doc_id, "pages"])?)
            .json(&CreatePageBody::from(page));
        self.send(request).await
    }

    async fn get_page(&self, doc_id: &str, page: &str) -> CodaResult<Page> {
        self.send(self.http.get(self.page_url(doc_id, page, &[])?))
            .await
    }

    async fn page_content(&self, doc_id: &str, page: &str) -> CodaResult<Option<String>> {
        let request = self
            .http
            .post(self.page_url(doc_id, page, &["export"])?)
            .json(&json!({ "outputFormat": "markdown" }));
        let export: ExportRequest = self.send(request).await?;
        debug!(export_id = %export.id, "export requested");

        let status_url = self.page_url(doc_id, page, &["export", export.id.as_str()])?;
        for attempt in 1..=self.export_max_attempts {
            tokio::time::sleep(self.export_poll_interval).await;

            let status: ExportStatus = self.send(self.http.get(status_url.clone())).await?;
            match status.status {
                ExportState::Complete => {
                    let Some(link) = status.download_link else {
                        warn!(export_id = %export.id, "export completed without a download link");
                        return Ok(None);
                    };
                    return self.download(&link).await.map(Some);
                }
                ExportState::Failed => {
                    warn!(
                        export_id = %export.id,
                        error = status.error.as_deref().unwrap_or("unknown"),
                        "export failed"
                    );
                    return Ok(None);
                }
                ExportState::InProgress | ExportState::Unknown => {
                    debug!(export_id = %export.id, attempt, "export not ready");
                }
            }
        }

        warn!(
            export_id = %export.id,
            attempts = self.export_max_attempts,
            "export did not complete in time"
        );
        Ok(None)
    }

    async fn update_page(
        &self,
        doc_id: &str,
        page: &str,
        update: &PageUpdate,
    ) -> CodaResult<PageReceipt> {
        let request = self
            .http
            .put(self.page_url(doc_id, page, &[])?)
            .json(&UpdatePageBody::from(update));
        self.send(request).await
    }

    async fn resolve_link(&self, url: &str) -> CodaResult<ResolvedLink> {
        let request = self
            .http
            .get(self.endpoint(&["resolveBrowserLink"])?)
            .query(&[("url", url)]);
        self.send(request).await
    }
}

/// Prefer the API's `message` field; fall back to the raw body
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}
