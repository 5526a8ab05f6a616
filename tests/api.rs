//! End-to-end router tests
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`,
//! with stub extraction collaborators so nothing touches the network.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use magpie::auth::{SaltedSha256, SessionTokens};
use magpie::ingest::{DiskBlobStore, IngestionPipeline, PageFetcher, PdfExtractor};
use magpie::server::{self, AppState};
use magpie::{ContentStore, UserDirectory};

const BOUNDARY: &str = "magpie-test-boundary";

struct StubPdf;

impl PdfExtractor for StubPdf {
    fn extract(&self, _bytes: &[u8]) -> Result<String> {
        Ok("stub pdf text".to_string())
    }
}

struct StubFetcher;

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        Ok("stub page body".to_string())
    }
}

fn test_app() -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();

    let pipeline = IngestionPipeline::new(
        Arc::new(DiskBlobStore::new(temp.path())),
        Arc::new(StubPdf),
        Arc::new(StubFetcher),
    );

    let state = Arc::new(AppState {
        users: UserDirectory::new(),
        content: ContentStore::new(),
        pipeline,
        passwords: Arc::new(SaltedSha256),
        tokens: Arc::new(SessionTokens::new()),
    });

    (server::router(state), temp)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_json(response).await)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = post_json(
        app,
        "/auth/register",
        serde_json::json!({"email": email, "password": "pw", "name": "Tester"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Build a multipart body from plain form fields
fn form_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

/// Build a multipart body carrying one file plus extra fields
fn file_body(filename: &str, mime: &str, content: &str, fields: &[(&str, &str)]) -> String {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
         filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n{content}\r\n"
    );
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

async fn upload(app: &Router, token: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/content/upload")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_json(response).await)
}

async fn get_authed(app: &Router, token: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_json(response).await)
}

async fn delete_authed(app: &Router, token: &str, uri: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_register_login_and_duplicate() {
    let (app, _temp) = test_app();

    let (status, body) = post_json(
        &app,
        "/auth/register",
        serde_json::json!({"email": "a@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "a@example.com");

    // Same email again: conflict.
    let (status, body) = post_json(
        &app,
        "/auth/register",
        serde_json::json!({"email": "a@example.com", "password": "pw2"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User exists");

    // Login with the right and wrong password.
    let (status, _) = post_json(
        &app,
        "/auth/login",
        serde_json::json!({"email": "a@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &app,
        "/auth/login",
        serde_json::json!({"email": "a@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let (app, _temp) = test_app();

    let (status, body) = post_json(
        &app,
        "/auth/register",
        serde_json::json!({"email": "a@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password required");
}

#[tokio::test]
async fn test_content_routes_require_bearer_token() {
    let (app, _temp) = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/content/list").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get_authed(&app, "not-a-real-token", "/content/list").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_text_upload_list_get_delete_cycle() {
    let (app, _temp) = test_app();
    let token = register(&app, "cycle@example.com").await;

    let (status, body) = upload(&app, &token, form_body(&[("text", "hello world")])).await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["item"];
    assert_eq!(item["type"], "text");
    assert_eq!(item["title"], "Untitled");
    assert_eq!(item["content_text"], "hello world");
    let id = item["id"].as_u64().unwrap();

    let (status, body) = get_authed(&app, &token, "/content/list").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body) = get_authed(&app, &token, &format!("/content/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["id"], id);

    assert_eq!(
        delete_authed(&app, &token, &format!("/content/{id}")).await,
        StatusCode::OK
    );
    // Gone now, and a second delete is a 404 as well.
    let (status, _) = get_authed(&app, &token, &format!("/content/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        delete_authed(&app, &token, &format!("/content/{id}")).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_markdown_upload_roundtrip() {
    let (app, _temp) = test_app();
    let token = register(&app, "md@example.com").await;

    let body = file_body("notes.md", "text/markdown", "# Title\nbody", &[]);
    let (status, response) = upload(&app, &token, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["item"]["type"], "markdown");
    assert_eq!(response["item"]["title"], "notes.md");
    assert_eq!(response["item"]["content_text"], "# Title\nbody");
    assert!(response["item"]["metadata"]["uploadedAt"].is_string());
}

#[tokio::test]
async fn test_owners_cannot_see_each_other() {
    let (app, _temp) = test_app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let (_, body) = upload(&app, &alice, form_body(&[("text", "alice's note")])).await;
    let id = body["item"]["id"].as_u64().unwrap();

    // Bob's reads and deletes behave as if the item does not exist.
    let (status, _) = get_authed(&app, &bob, &format!("/content/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        delete_authed(&app, &bob, &format!("/content/{id}")).await,
        StatusCode::NOT_FOUND
    );

    let (_, body) = get_authed(&app, &bob, "/content/list").await;
    assert!(body["items"].as_array().unwrap().is_empty());

    // Alice still has it.
    let (status, _) = get_authed(&app, &alice, &format!("/content/{id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_filters_by_substring() {
    let (app, _temp) = test_app();
    let token = register(&app, "search@example.com").await;

    upload(&app, &token, form_body(&[("text", "x"), ("title", "Hello there")])).await;
    upload(&app, &token, form_body(&[("text", "y"), ("title", "Goodbye")])).await;

    let (status, body) = get_authed(&app, &token, "/content/search?q=hello").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Hello there");
}

#[tokio::test]
async fn test_search_rejects_malformed_dates() {
    let (app, _temp) = test_app();
    let token = register(&app, "dates@example.com").await;

    let (status, body) = get_authed(&app, &token, "/content/search?fromDate=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid date format"));
}

#[tokio::test]
async fn test_upload_error_mapping() {
    let (app, _temp) = test_app();
    let token = register(&app, "errors@example.com").await;

    // Nothing submitted at all.
    let (status, body) = upload(&app, &token, form_body(&[("title", "empty")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No content provided");

    // An empty text field is no content either, not an empty item.
    let (status, body) = upload(&app, &token, form_body(&[("text", "")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No content provided");

    // Disallowed MIME type.
    let zip = file_body("archive.zip", "application/zip", "PK", &[]);
    let (status, body) = upload(&app, &token, zip).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Unsupported file type");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_with_413() {
    let (app, _temp) = test_app();
    let token = register(&app, "huge@example.com").await;

    // Past the pipeline cap but under the request body limit.
    let big = "a".repeat(10 * 1024 * 1024 + 1);
    let (status, body) = upload(&app, &token, file_body("big.txt", "text/plain", &big, &[])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Payload too large");

    // Past the request body limit as well; still a 413, not a generic 400.
    let bigger = "a".repeat(12 * 1024 * 1024);
    let (status, body) =
        upload(&app, &token, file_body("bigger.txt", "text/plain", &bigger, &[])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Payload too large");
}

#[tokio::test]
async fn test_url_upload_uses_fetcher() {
    let (app, _temp) = test_app();
    let token = register(&app, "web@example.com").await;

    let (status, body) = upload(
        &app,
        &token,
        form_body(&[("url", "https://example.com/article")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["type"], "web");
    assert_eq!(body["item"]["source"], "https://example.com/article");
    assert_eq!(body["item"]["content_text"], "stub page body");
    assert_eq!(body["item"]["title"], "https://example.com/article");
}
