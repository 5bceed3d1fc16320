//! Coda REST API access
//!
//! [`DocClient`] is the seam between the tool handlers and the remote
//! document service. [`CodaClient`] implements it over HTTPS; tests supply
//! their own implementations.

mod client;
mod error;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::CodaClient;
pub use error::{CodaError, CodaResult};
pub use types::{
    Doc, DocList, InsertionMode, LinkResource, NewPage, Page, PageList, PageReceipt, PageUpdate,
    ResolvedLink,
};

/// Operations the tools need from the document service
///
/// Pages may be addressed by id or by name wherever `page` appears.
#[async_trait]
pub trait DocClient: Send + Sync {
    /// List documents, optionally filtered by a search query
    async fn list_documents(&self, query: Option<&str>) -> CodaResult<DocList>;

    /// List pages in a document
    ///
    /// When `page_token` is set it alone determines the page of results and
    /// `limit` is ignored by the service.
    async fn list_pages(
        &self,
        doc_id: &str,
        limit: Option<u32>,
        page_token: Option<&str>,
    ) -> CodaResult<PageList>;

    async fn create_page(&self, doc_id: &str, page: &NewPage) -> CodaResult<PageReceipt>;

    async fn get_page(&self, doc_id: &str, page: &str) -> CodaResult<Page>;

    /// Export a page as markdown
    ///
    /// `Ok(None)` means the export finished without usable content: it
    /// failed, produced no download link, or did not complete in time.
    async fn page_content(&self, doc_id: &str, page: &str) -> CodaResult<Option<String>>;

    async fn update_page(
        &self,
        doc_id: &str,
        page: &str,
        update: &PageUpdate,
    ) -> CodaResult<PageReceipt>;

    /// Resolve a browser URL into the identifiers of the object it points at
    async fn resolve_link(&self, url: &str) -> CodaResult<ResolvedLink>;
}

/// Client handle shared by every tool handler of a registry
pub type SharedClient = Arc<dyn DocClient>;
