//! In-memory `DocClient` that records every call

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coda_mcp::coda::{
    CodaError, CodaResult, Doc, DocClient, DocList, InsertionMode, NewPage, Page, PageList,
    PageReceipt, PageUpdate, ResolvedLink, LinkResource,
};
use mcp_common::{JsonObject, ToolInvocation};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDocuments {
        query: Option<String>,
    },
    ListPages {
        doc_id: String,
        limit: Option<u32>,
        page_token: Option<String>,
    },
    CreatePage {
        doc_id: String,
        page: NewPage,
    },
    GetPage {
        doc_id: String,
        page: String,
    },
    PageContent {
        doc_id: String,
        page: String,
    },
    UpdatePage {
        doc_id: String,
        page: String,
        update: PageUpdate,
    },
    ResolveLink {
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ok,
    /// Every call fails with a remote error
    Failing,
    /// Content exports finish without content
    NoContent,
}

pub struct StubClient {
    mode: Mode,
    calls: Mutex<Vec<Call>>,
    pages: Mutex<HashMap<String, String>>,
    /// Content reads of a page named "slow" wait on this; reads of
    /// "broken" panic
    gate: Arc<Notify>,
}

impl StubClient {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
            pages: Mutex::new(HashMap::new()),
            gate: Arc::new(Notify::new()),
        }
    }

    pub fn with_page(self, page: &str, content: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(page.to_string(), content.to_string());
        self
    }

    pub fn gate(&self) -> Arc<Notify> {
        Arc::clone(&self.gate)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreatePage { .. }))
            .count()
    }

    fn record(&self, call: Call) -> CodaResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.mode {
            Mode::Failing => Err(CodaError::Status {
                status: StatusCode::FORBIDDEN,
                message: "Access denied".to_string(),
            }),
            Mode::Ok | Mode::NoContent => Ok(()),
        }
    }

    fn receipt(id: &str) -> PageReceipt {
        PageReceipt {
            id: id.to_string(),
            request_id: Some("mutate:1".to_string()),
        }
    }
}

#[async_trait]
impl DocClient for StubClient {
    async fn list_documents(&self, query: Option<&str>) -> CodaResult<DocList> {
        self.record(Call::ListDocuments {
            query: query.map(str::to_string),
        })?;
        Ok(DocList {
            items: vec![Doc {
                id: "doc-1".to_string(),
                name: "Roadmap".to_string(),
                ..Doc::default()
            }],
            ..DocList::default()
        })
    }

    async fn list_pages(
        &self,
        doc_id: &str,
        limit: Option<u32>,
        page_token: Option<&str>,
    ) -> CodaResult<PageList> {
        self.record(Call::ListPages {
            doc_id: doc_id.to_string(),
            limit,
            page_token: page_token.map(str::to_string),
        })?;
        let items = self
            .pages
            .lock()
            .unwrap()
            .keys()
            .map(|name| Page {
                id: format!("canvas-{}", name),
                name: name.clone(),
                ..Page::default()
            })
            .collect();
        Ok(PageList {
            items,
            ..PageList::default()
        })
    }

    async fn create_page(&self, doc_id: &str, page: &NewPage) -> CodaResult<PageReceipt> {
        self.record(Call::CreatePage {
            doc_id: doc_id.to_string(),
            page: page.clone(),
        })?;
        self.pages
            .lock()
            .unwrap()
            .insert(page.name.clone(), page.content.clone());
        Ok(Self::receipt(&format!("canvas-{}", page.name)))
    }

    async fn get_page(&self, doc_id: &str, page: &str) -> CodaResult<Page> {
        self.record(Call::GetPage {
            doc_id: doc_id.to_string(),
            page: page.to_string(),
        })?;
        Ok(Page {
            id: format!("canvas-{}", page),
            name: page.to_string(),
            browser_link: Some(format!("https://coda.io/d/_d{}/{}", doc_id, page)),
            ..Page::default()
        })
    }

    async fn page_content(&self, doc_id: &str, page: &str) -> CodaResult<Option<String>> {
        self.record(Call::PageContent {
            doc_id: doc_id.to_string(),
            page: page.to_string(),
        })?;
        if page == "slow" {
            self.gate.notified().await;
        }
        if page == "broken" {
            panic!("stub content read blew up");
        }
        if self.mode == Mode::NoContent {
            return Ok(None);
        }
        Ok(self.pages.lock().unwrap().get(page).cloned())
    }

    async fn update_page(
        &self,
        doc_id: &str,
        page: &str,
        update: &PageUpdate,
    ) -> CodaResult<PageReceipt> {
        self.record(Call::UpdatePage {
            doc_id: doc_id.to_string(),
            page: page.to_string(),
            update: update.clone(),
        })?;

        let mut pages = self.pages.lock().unwrap();
        if let Some((mode, markdown)) = &update.content {
            let entry = pages.entry(page.to_string()).or_default();
            match mode {
                InsertionMode::Replace => *entry = markdown.clone(),
                InsertionMode::Append => entry.push_str(markdown),
            }
        }
        if let Some(name) = &update.name {
            if let Some(content) = pages.remove(page) {
                pages.insert(name.clone(), content);
            }
        }
        Ok(Self::receipt(&format!("canvas-{}", page)))
    }

    async fn resolve_link(&self, url: &str) -> CodaResult<ResolvedLink> {
        self.record(Call::ResolveLink {
            url: url.to_string(),
        })?;
        Ok(ResolvedLink {
            resource: LinkResource {
                id: "canvas-1".to_string(),
                kind: "page".to_string(),
                ..LinkResource::default()
            },
            browser_link: Some(url.to_string()),
            ..ResolvedLink::default()
        })
    }
}

pub fn invocation(tool: &str, arguments: Value) -> ToolInvocation {
    let arguments: JsonObject = match arguments {
        Value::Object(map) => map,
        other => panic!("arguments must be an object, got {}", other),
    };
    ToolInvocation::new(tool, arguments)
}
