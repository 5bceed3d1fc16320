//! `CodaClient` against a mock Coda API

use std::time::Duration;

use coda_mcp::coda::{CodaClient, CodaError, DocClient, InsertionMode, NewPage, PageUpdate};
use coda_mcp::config::CodaConfig;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const API_KEY: &str = "test-key";

fn config(server: &MockServer) -> CodaConfig {
    CodaConfig {
        api_key: API_KEY.to_string(),
        base_url: format!("{}/apis/v1", server.uri()),
        request_timeout_secs: 5,
        export_poll_interval_ms: 1,
        export_max_attempts: 3,
    }
}

fn client(server: &MockServer) -> CodaClient {
    CodaClient::new(&config(server)).unwrap()
}

fn authorized() -> wiremock::matchers::HeaderExactMatcher {
    header("authorization", format!("Bearer {}", API_KEY).as_str())
}

/// Matches requests that carry no credentials
struct Anonymous;

impl Match for Anonymous {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn test_list_documents_sends_bearer_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs"))
        .and(query_param("query", "roadmap"))
        .and(authorized())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "AbCd", "type": "doc", "name": "Roadmap", "owner": "a@b.c" }],
            "href": "https://coda.io/apis/v1/docs"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let docs = client(&server).list_documents(Some("roadmap")).await.unwrap();
    assert_eq!(docs.items.len(), 1);
    assert_eq!(docs.items[0].name, "Roadmap");
    assert_eq!(docs.items[0].extra.get("owner"), Some(&json!("a@b.c")));
}

#[tokio::test]
async fn test_list_pages_limit_or_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages"))
        .and(query_param("limit", "25"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "canvas-1", "name": "Intro" }],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages"))
        .and(query_param("pageToken", "next"))
        .and(query_param_is_missing("limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.list_pages("AbCd", Some(25), None).await.unwrap();
    assert_eq!(first.next_page_token.as_deref(), Some("next"));

    let second = client.list_pages("AbCd", None, Some("next")).await.unwrap();
    assert!(second.items.is_empty());
}

#[tokio::test]
async fn test_create_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apis/v1/docs/AbCd/pages"))
        .and(authorized())
        .and(body_json(json!({
            "name": "Notes",
            "parentPageId": "canvas-1",
            "pageContent": {
                "type": "canvas",
                "canvasContent": { "format": "markdown", "content": " " }
            }
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "requestId": "abc-123", "id": "canvas-2" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client(&server)
        .create_page(
            "AbCd",
            &NewPage {
                name: "Notes".to_string(),
                content: " ".to_string(),
                parent_page_id: Some("canvas-1".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.id, "canvas-2");
    assert_eq!(receipt.request_id.as_deref(), Some("abc-123"));
}

#[tokio::test]
async fn test_update_page_content_and_name() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/apis/v1/docs/AbCd/pages/Meeting%20Notes"))
        .and(body_json(json!({
            "contentUpdate": {
                "insertionMode": "replace",
                "canvasContent": { "format": "markdown", "content": "# New" }
            }
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "requestId": "r1", "id": "canvas-3" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/apis/v1/docs/AbCd/pages/canvas-3"))
        .and(body_json(json!({ "name": "Renamed" })))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "requestId": "r2", "id": "canvas-3" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .update_page(
            "AbCd",
            "Meeting Notes",
            &PageUpdate::content(InsertionMode::Replace, "# New"),
        )
        .await
        .unwrap();
    client
        .update_page("AbCd", "canvas-3", &PageUpdate::rename("Renamed"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_page_content_polls_export_and_downloads_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apis/v1/docs/AbCd/pages/canvas-1/export"))
        .and(authorized())
        .and(body_json(json!({ "outputFormat": "markdown" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "id": "exp-1",
            "status": "inProgress",
            "href": "https://coda.io/apis/v1/docs/AbCd/pages/canvas-1/export/exp-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/canvas-1/export/exp-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "exp-1",
            "status": "inProgress"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/canvas-1/export/exp-1"))
        .and(authorized())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "exp-1",
            "status": "complete",
            "downloadLink": format!("{}/downloads/exp-1.md", server.uri())
        })))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/downloads/exp-1.md"))
        .and(Anonymous)
        .respond_with(ResponseTemplate::new(200).set_body_string("# Intro\nHello"))
        .expect(1)
        .mount(&server)
        .await;

    let content = client(&server)
        .page_content("AbCd", "canvas-1")
        .await
        .unwrap();
    assert_eq!(content.as_deref(), Some("# Intro\nHello"));
}

#[tokio::test]
async fn test_failed_export_yields_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "id": "exp-2", "status": "inProgress" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export/exp-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "exp-2",
            "status": "failed",
            "error": "Export failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = client(&server).page_content("AbCd", "p").await.unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_unfinished_export_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "id": "exp-3", "status": "inProgress" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export/exp-3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "exp-3", "status": "inProgress" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let content = client(&server).page_content("AbCd", "p").await.unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_complete_export_without_link_yields_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "id": "exp-4", "status": "inProgress" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/p/export/exp-4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "exp-4", "status": "complete" })),
        )
        .mount(&server)
        .await;

    let content = client(&server).page_content("AbCd", "p").await.unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_error_status_carries_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs/AbCd/pages/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "statusMessage": "Not Found",
            "message": "Page not found."
        })))
        .mount(&server)
        .await;

    let err = client(&server).get_page("AbCd", "missing").await.unwrap_err();
    match &err {
        CodaError::Status { status, message } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "Page not found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), "Coda API returned 404 Not Found: Page not found.");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/docs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = CodaClient::new(&CodaConfig {
        request_timeout_secs: 1,
        ..config(&server)
    })
    .unwrap();

    let err = client.list_documents(None).await.unwrap_err();
    assert!(matches!(err, CodaError::Timeout(_)), "{:?}", err);
}

#[tokio::test]
async fn test_resolve_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis/v1/resolveBrowserLink"))
        .and(query_param("url", "https://coda.io/d/_dAbCd/Intro_su1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "apiLink",
            "href": "https://coda.io/apis/v1/resolveBrowserLink?url=x",
            "browserLink": "https://coda.io/d/_dAbCd/Intro_su1",
            "resource": {
                "type": "page",
                "id": "canvas-1",
                "name": "Intro",
                "href": "https://coda.io/apis/v1/docs/AbCd/pages/canvas-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolved = client(&server)
        .resolve_link("https://coda.io/d/_dAbCd/Intro_su1")
        .await
        .unwrap();
    assert_eq!(resolved.resource.kind, "page");
    assert_eq!(resolved.resource.id, "canvas-1");
    assert_eq!(resolved.extra.get("type"), Some(&json!("apiLink")));
}
