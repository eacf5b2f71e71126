//! Backend management API integration tests
//!
//! Registration, listing, updates, stop and removal through the router.

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};

use bbbgate::backend::store::{AdminState, NodeState};
use bbbgate::shared::GatewayConfig;

use crate::common::{BackendSeed, TestGateway};

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_register_backend() {
    let gateway = TestGateway::new();

    let response = gateway
        .server
        .post("/api/v1/backends")
        .json(&json!({
            "host": "https://bbb1.example.com/bigbluebutton",
            "secret": "s3cr3t",
            "tags": ["sip"],
            "agent_ref": "node-1",
            "settings": {"max_meetings": 20, "region": "eu"}
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["host"], "https://bbb1.example.com/bigbluebutton");
    assert_eq!(body["admin_state"], "disabled");
    assert_eq!(body["node_state"], "stopped");
    assert_eq!(body["agent_ref"], "node-1");
    assert_eq!(body["settings"]["region"], "eu");
    assert!(body.get("secret").is_none(), "secret must not be exposed");

    let stored = gateway.store.snapshot().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].secret, "s3cr3t");
    assert_eq!(stored[0].settings.max_meetings, Some(20));
}

#[tokio::test]
async fn test_register_enabled_by_policy() {
    let config = GatewayConfig::builder().enable_on_register(true).build().unwrap();
    let gateway = TestGateway::with_config(config);

    let response = gateway
        .server
        .post("/api/v1/backends")
        .json(&json!({"host": "https://bbb1.example.com", "secret": "s"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["admin_state"], "enabled");
    assert_eq!(body["node_state"], "stopped");
}

#[tokio::test]
async fn test_register_validation() {
    let gateway = TestGateway::new();

    let response = gateway
        .server
        .post("/api/v1/backends")
        .json(&json!({"host": "bbb1.example.com", "secret": "s"}))
        .await;
    let message = assert_error_response!(response, StatusCode::BAD_REQUEST);
    assert_contains!(message, "host");

    let response = gateway
        .server
        .post("/api/v1/backends")
        .json(&json!({"host": "https://bbb1.example.com", "secret": ""}))
        .await;
    assert_error_response!(response, StatusCode::BAD_REQUEST);

    assert!(gateway.store.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_agent_ref_rejected() {
    let gateway = TestGateway::new();
    BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;

    let response = gateway
        .server
        .post("/api/v1/backends")
        .json(&json!({
            "host": "https://bbb2.example.com",
            "secret": "s",
            "agent_ref": "node-1"
        }))
        .await;

    let message = assert_error_response!(response, StatusCode::BAD_REQUEST);
    assert_contains!(message, "agent_ref");
    assert_eq!(gateway.store.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_list_filters() {
    let gateway = TestGateway::new();
    let eligible = BackendSeed::eligible("https://bbb1.example.com")
        .tags(&["sip"])
        .insert(&gateway.store)
        .await;
    let stale = BackendSeed::eligible("https://bbb2.example.com")
        .heartbeat(Utc::now() - ChronoDuration::seconds(60))
        .tags(&["sip"])
        .insert(&gateway.store)
        .await;
    let disabled = BackendSeed::eligible("https://bbb3.example.com")
        .admin(AdminState::Disabled)
        .insert(&gateway.store)
        .await;

    let all: Value = gateway.server.get("/api/v1/backends").await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = gateway
        .server
        .get("/api/v1/backends")
        .add_query_param("eligible", "true")
        .await;
    assert_eq!(ids(&response.json()), vec![eligible.id.to_string()]);

    let response = gateway
        .server
        .get("/api/v1/backends")
        .add_query_param("tag", "sip")
        .await;
    let tagged = ids(&response.json());
    assert_eq!(tagged.len(), 2);
    assert!(tagged.contains(&stale.id.to_string()));
    assert!(!tagged.contains(&disabled.id.to_string()));
}

#[tokio::test]
async fn test_get_unknown_backend() {
    let gateway = TestGateway::new();
    let response = gateway
        .server
        .get(&format!("/api/v1/backends/{}", uuid::Uuid::new_v4()))
        .await;
    assert_error_response!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_backend() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;

    let response = gateway
        .server
        .patch(&format!("/api/v1/backends/{}", backend.id))
        .json(&json!({
            "admin_state": "enabled",
            "tags": ["gpu"],
            "agent_ref": ""
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let stored = gateway.backend(backend.id).await.unwrap();
    assert_eq!(stored.admin_state, AdminState::Enabled);
    assert_eq!(stored.tags, vec!["gpu".to_string()]);
    assert_eq!(stored.agent_ref, None);
    assert_eq!(stored.node_state, NodeState::Stopped);
}

#[tokio::test]
async fn test_failed_update_leaves_backend_unchanged() {
    let gateway = TestGateway::new();
    BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;
    let other = BackendSeed::new("https://bbb2.example.com").insert(&gateway.store).await;

    let response = gateway
        .server
        .patch(&format!("/api/v1/backends/{}", other.id))
        .json(&json!({"tags": ["changed"], "agent_ref": "node-1"}))
        .await;

    assert_error_response!(response, StatusCode::BAD_REQUEST);
    assert_eq!(gateway.backend(other.id).await.unwrap(), other);
}

#[tokio::test]
async fn test_stop_backend() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::eligible("https://bbb1.example.com")
        .insert(&gateway.store)
        .await;

    let response = gateway
        .server
        .post(&format!("/api/v1/backends/{}/stop", backend.id))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["node_state"], "stopped");
    assert_eq!(body["admin_state"], "disabled");

    let response = gateway
        .server
        .get("/api/v1/backends")
        .add_query_param("eligible", "true")
        .await;
    assert!(ids(&response.json()).is_empty());
}

#[tokio::test]
async fn test_delete_backend() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com").insert(&gateway.store).await;
    let path = format!("/api/v1/backends/{}", backend.id);

    let response = gateway.server.delete(&path).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(gateway.store.snapshot().await.is_empty());

    let response = gateway.server.delete(&path).await;
    assert_error_response!(response, StatusCode::NOT_FOUND);
}
