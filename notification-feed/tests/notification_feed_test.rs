mod common;

use common::{test_config, TestApp};
use notification_feed::config::{MongoConfig, StoreBackend};
use notification_feed::services::{InMemoryStore, StoredDocument, NOTIFICATIONS_COLLECTION};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn document(id: &str, fields: Value) -> StoredDocument {
    let fields: Map<String, Value> = match fields {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    };
    StoredDocument::new(id, fields)
}

// =============================================================================
// GET /get-notifications
// =============================================================================

#[tokio::test]
async fn notifications_are_returned_newest_first() {
    let store = InMemoryStore::new().with_documents(
        NOTIFICATIONS_COLLECTION,
        [
            document("a", json!({ "timestamp": 1 })),
            document("b", json!({ "timestamp": 2 })),
        ],
    );
    let app = TestApp::spawn_with_store(Arc::new(store)).await;

    let response = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": [{ "id": "b", "timestamp": 2 }, { "id": "a", "timestamp": 1 }]
        })
    );
}

#[tokio::test]
async fn document_fields_are_passed_through_with_store_id() {
    let store = InMemoryStore::new().with_documents(
        NOTIFICATIONS_COLLECTION,
        [document(
            "doc-7",
            json!({
                "id": "embedded",
                "timestamp": "2024-03-01T08:00:00Z",
                "title": "Water supply interrupted",
                "audience": { "wards": [3, 4] }
            }),
        )],
    );
    let app = TestApp::spawn_with_store(Arc::new(store)).await;

    let body: Value = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let item = &body["data"][0];
    assert_eq!(item["id"], "doc-7");
    assert_eq!(item["title"], "Water supply interrupted");
    assert_eq!(item["audience"]["wards"], json!([3, 4]));
}

#[tokio::test]
async fn empty_collection_returns_empty_data() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::new())).await;

    let response = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "success": true, "data": [] }));
}

#[tokio::test]
async fn store_failure_returns_500_with_message() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::failing("permission denied"))).await;

    let response = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "success": false, "message": "permission denied" }));
}

#[tokio::test]
async fn every_request_reads_the_store() {
    let store = Arc::new(InMemoryStore::new());
    let app = TestApp::spawn_with_store(store.clone()).await;
    let client = Client::new();

    for _ in 0..3 {
        client
            .get(app.url("/get-notifications"))
            .send()
            .await
            .expect("Failed to execute request");
    }

    assert_eq!(store.query_count(), 3);
}

// =============================================================================
// Cross-cutting HTTP behaviour
// =============================================================================

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::new())).await;

    let response = Client::new()
        .get(app.url("/get-notifications"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::new())).await;

    let response = Client::new()
        .get(app.url("/get-notifications"))
        .header("x-request-id", "feed-req-1")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "feed-req-1");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::new())).await;

    let response = Client::new()
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "notification-feed");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn unreachable_store_reports_unhealthy() {
    let app = TestApp::spawn_with_store(Arc::new(InMemoryStore::failing("connection refused"))).await;
    let client = Client::new();

    let health = client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(health.status().as_u16(), 503);
    let body: Value = health.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["error"], "connection refused");

    let ready = client
        .get(app.url("/ready"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(ready.status().as_u16(), 503);
}

#[tokio::test]
async fn memory_backend_can_be_selected_by_configuration() {
    let config = test_config(
        StoreBackend::Memory,
        MongoConfig {
            uri: String::new(),
            database: "unused".to_string(),
        },
    );
    let app = TestApp::spawn_from_config(config).await;

    let body: Value = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body, json!({ "success": true, "data": [] }));
    assert_ne!(app.port, 0);
}

#[tokio::test]
async fn memory_backend_serves_seed_file() {
    let seed_path = std::env::temp_dir().join(format!("feed-seed-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &seed_path,
        r#"{
            "notifications": [
                { "id": "a", "timestamp": 1, "title": "Library closed" },
                { "id": "b", "timestamp": 2, "title": "Library reopened" }
            ]
        }"#,
    )
    .expect("Failed to write seed file");

    let mut config = test_config(
        StoreBackend::Memory,
        MongoConfig {
            uri: String::new(),
            database: "unused".to_string(),
        },
    );
    config.store.memory_seed_path = Some(seed_path.to_string_lossy().into_owned());

    let app = TestApp::spawn_from_config(config).await;
    std::fs::remove_file(&seed_path).ok();

    let body: Value = Client::new()
        .get(app.url("/get-notifications"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(
        body,
        json!({
            "success": true,
            "data": [
                { "id": "b", "timestamp": 2, "title": "Library reopened" },
                { "id": "a", "timestamp": 1, "title": "Library closed" }
            ]
        })
    );
}
