//! Integration tests for the tagdb HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use serde_json::json;
use tagdb::api::{
    AppState, ElementResponse, HealthResponse, QueryResponse, StatusResponse, TagResponse,
    create_router,
};
use tagdb::config::HttpConfig;
use tagdb_core::{Element, QueryEngine, Store};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn open_settings() -> HttpConfig {
    HttpConfig {
        rate_limit: 0,
        ..HttpConfig::default()
    }
}

/// Create a test server with an empty store.
fn create_test_server() -> TestServer {
    let state = AppState::new(Store::new("admin"), QueryEngine::default());
    TestServer::new(create_router(state, &open_settings())).unwrap()
}

/// Create a test server with some pre-populated data.
fn create_populated_test_server() -> TestServer {
    let mut store = Store::new("admin");
    store.insert(
        "key0",
        Element::with_tags("Anakin Skywalker", ["Siths", "Data", "Star Wars"]),
    );
    store.insert(
        "key2",
        Element::with_tags("T-100", ["Terminator", "Data", "Machine"]),
    );
    store.insert(
        "key3",
        Element::with_tags("Dolores", ["Westworld", "Machine", "AI"]),
    );

    let state = AppState::new(store, QueryEngine::default());
    TestServer::new(create_router(state, &open_settings())).unwrap()
}

fn create_authenticated_server(key: &str) -> TestServer {
    let settings = HttpConfig {
        api_key: Some(key.to_string()),
        ..open_settings()
    };
    let state = AppState::new(Store::default(), QueryEngine::default());
    TestServer::new(create_router(state, &settings)).unwrap()
}

// =============================================================================
// HEALTH AND STATUS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_empty_store() {
    let server = create_test_server();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.owner, "admin");
    assert_eq!(status.element_count, 0);
    assert_eq!(status.tag_count, 0);
}

#[tokio::test]
async fn test_status_populated_store() {
    let server = create_populated_test_server();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.element_count, 3);
    // Siths, Data, Star Wars, Terminator, Machine, Westworld, AI
    assert_eq!(status.tag_count, 7);
}

// =============================================================================
// QUERY ENDPOINT
// =============================================================================

#[tokio::test]
async fn test_query_insert_then_show() {
    let server = create_test_server();

    let response = server
        .post("/query")
        .json(&json!({ "query": "-t INSERT -k key6 -v Wyatt" }))
        .await;
    response.assert_status_ok();
    let inserted: QueryResponse = response.json();
    assert!(inserted.success);
    assert_eq!(
        inserted.response,
        "Object Successfully inserted into Database."
    );

    let shown: QueryResponse = server
        .post("/query")
        .json(&json!({ "query": "-t SHOW -k key6" }))
        .await
        .json();
    assert!(shown.success);
    assert!(shown.response.contains(" Data      : Wyatt\n"));
}

#[tokio::test]
async fn test_query_syntax_error_is_bad_request() {
    let server = create_test_server();

    let response = server
        .post("/query")
        .json(&json!({ "query": "-t SELECT -k key0" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: QueryResponse = response.json();
    assert!(!body.success);
    assert_eq!(
        body.response,
        "Invalid Query Syntax. Given Query Type is Not Supported."
    );
}

#[tokio::test]
async fn test_query_missing_key_is_not_found() {
    let server = create_test_server();

    let response = server
        .post("/query")
        .json(&json!({ "query": "-t DELETE -k nope" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: QueryResponse = response.json();
    assert!(!body.success);
}

#[tokio::test]
async fn test_query_show_missing_key_is_not_found() {
    let server = create_populated_test_server();

    let response = server
        .post("/query")
        .json(&json!({ "query": "-t SHOW -k missing" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: QueryResponse = response.json();
    assert!(!body.success);
    assert_eq!(body.response, "Invalid Key");
}

#[tokio::test]
async fn test_query_duplicate_insert_is_conflict() {
    let server = create_populated_test_server();

    let response = server
        .post("/query")
        .json(&json!({ "query": "-t INSERT -k key0 -v Vader" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_query_show_by_tag() {
    let server = create_populated_test_server();

    let body: QueryResponse = server
        .post("/query")
        .json(&json!({ "query": "-t SHOW -o ByTag -p Machine" }))
        .await
        .json();
    assert!(body.success);
    assert!(body.response.contains(" Key : key2\n"));
    assert!(body.response.contains(" Key : key3\n"));
    assert!(!body.response.contains(" Key : key0\n"));
}

#[tokio::test]
async fn test_query_tag_updates_are_visible_in_tag_listing() {
    let server = create_populated_test_server();

    let body: QueryResponse = server
        .post("/query")
        .json(&json!({ "query": "-t UPDATE -k key2 -o AddTag -p AI" }))
        .await
        .json();
    assert!(body.success);

    let tags: TagResponse = server.get("/tags/AI").await.json();
    assert!(tags.indexed);
    assert_eq!(tags.keys, vec!["key2".to_string(), "key3".to_string()]);
}

// =============================================================================
// ELEMENT AND TAG ENDPOINTS
// =============================================================================

#[tokio::test]
async fn test_element_found() {
    let server = create_populated_test_server();

    let response = server.get("/elements/key2").await;
    response.assert_status_ok();
    let element: ElementResponse = response.json();
    assert!(element.found);
    assert_eq!(element.payload.as_deref(), Some("T-100"));
    assert_eq!(element.tags, vec!["Data", "Machine", "Terminator"]);
    assert!(element.last_modified.is_some());
}

#[tokio::test]
async fn test_element_not_found() {
    let server = create_test_server();

    let response = server.get("/elements/missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let element: ElementResponse = response.json();
    assert!(!element.found);
    assert!(element.payload.is_none());
}

#[tokio::test]
async fn test_tag_never_indexed() {
    let server = create_populated_test_server();

    let tags: TagResponse = server.get("/tags/Unknown").await.json();
    assert!(!tags.indexed);
    assert!(tags.keys.is_empty());
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_auth_health_is_public() {
    let server = create_authenticated_server("s3cret");
    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let server = create_authenticated_server("s3cret");
    server
        .get("/status")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_wrong_key_rejected() {
    let server = create_authenticated_server("s3cret");
    server
        .get("/status")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_bearer_key_accepted() {
    let server = create_authenticated_server("s3cret");
    server
        .post("/query")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"))
        .json(&json!({ "query": "-t SHOW" }))
        .await
        .assert_status_ok();
}

// =============================================================================
// LIMITS
// =============================================================================

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = create_test_server();
    let huge = "x".repeat(128 * 1024);

    let response = server
        .post("/query")
        .json(&json!({ "query": huge }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let settings = HttpConfig {
        rate_limit: 1,
        ..HttpConfig::default()
    };
    let state = AppState::new(Store::default(), QueryEngine::default());
    let server = TestServer::new(create_router(state, &settings)).unwrap();

    server.get("/health").await.assert_status_ok();
    server
        .get("/health")
        .expect_failure()
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
