//! Router tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.
//! The pool connects lazily, so only routes that answer before touching the
//! database are exercised here.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wim_backend::config::{
    Config, DatabaseConfig, GeminiConfig, InventoryFeedConfig, ServerConfig,
};
use wim_backend::{create_app, AppState};

fn test_config(gemini_key: &str, upstream: &str) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/wim_test".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        gemini: GeminiConfig {
            api_key: gemini_key.to_string(),
            endpoint: format!("{}/v1beta", upstream),
            model: "gemini-pro".to_string(),
            timeout_secs: 5,
        },
        inventory_feed: InventoryFeedConfig {
            url: format!("{}/api/inventory", upstream),
            timeout_secs: 5,
        },
    }
}

fn test_app(config: Config) -> Router {
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .unwrap();
    create_app(AppState::new(db, config).unwrap())
}

async fn post_query(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/query")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn gemini_answering(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .mount(&server)
        .await;
    server
}

// ============================================================================
// Root
// ============================================================================

#[tokio::test]
async fn test_root_banner() {
    let app = test_app(test_config("", "http://127.0.0.1:9"));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("Warehouse Inventory"));
}

// ============================================================================
// Natural-language queries
// ============================================================================

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let app = test_app(test_config("AIzaSyExample", "http://127.0.0.1:9"));
    let (status, body) = post_query(app, json!({ "query": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["field"], "query");
}

#[tokio::test]
async fn test_missing_query_field_is_bad_request() {
    let app = test_app(test_config("", "http://127.0.0.1:9"));
    let (status, _) = post_query(app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unconfigured_key_reports_failure() {
    let app = test_app(test_config("your-gemini-api-key-here", "http://127.0.0.1:9"));
    let (status, body) = post_query(app, json!({ "query": "what expires this week?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Gemini API key not configured");
}

#[tokio::test]
async fn test_unconvertible_question() {
    let server = gemini_answering("").await;
    let app = test_app(test_config("AIzaSyExample", &server.uri()));
    let (status, body) = post_query(app, json!({ "query": "tell me a joke" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to convert query to SQL");
}

#[tokio::test]
async fn test_language_model_outage_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(test_config("AIzaSyExample", &server.uri()));
    let (status, body) = post_query(app, json!({ "query": "what expires this week?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to convert query to SQL");
}

#[tokio::test]
async fn test_generated_write_is_refused() {
    let server = gemini_answering("DELETE FROM products").await;
    let app = test_app(test_config("AIzaSyExample", &server.uri()));
    let (status, body) = post_query(app, json!({ "query": "remove all products" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

// ============================================================================
// Inventory feed
// ============================================================================

#[tokio::test]
async fn test_inventory_passthrough() {
    let server = MockServer::start().await;
    let payload = json!({ "items": [{ "sku": "DAIRY-MILK-001", "onHand": 200 }] });
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let app = test_app(test_config("", &server.uri()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/inventory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_inventory_upstream_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = test_app(test_config("", &server.uri()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/inventory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
