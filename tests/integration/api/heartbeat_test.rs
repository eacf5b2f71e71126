//! Agent heartbeat API integration tests

use axum::http::{HeaderName, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::Value;

use bbbgate::backend::store::{AdminState, NodeState};

use crate::common::{BackendSeed, TestGateway};

const AGENT_REF: HeaderName = HeaderName::from_static("x-agent-ref");

#[tokio::test]
async fn test_heartbeat_updates_timestamp() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;
    let before = Utc::now();

    let response = gateway
        .server
        .post("/api/v1/agent/heartbeat")
        .add_header(AGENT_REF, HeaderValue::from_static("node-1"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["backend_id"], backend.id.to_string());
    let reported: DateTime<Utc> = body["heartbeat"].as_str().unwrap().parse().unwrap();
    assert!(reported >= before);

    let stored = gateway.backend(backend.id).await.unwrap();
    assert_eq!(stored.agent_heartbeat, Some(reported));
}

#[tokio::test]
async fn test_heartbeat_unknown_agent() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;

    let response = gateway
        .server
        .post("/api/v1/agent/heartbeat")
        .add_header(AGENT_REF, HeaderValue::from_static("node-2"))
        .await;

    assert_error_response!(response, StatusCode::NOT_FOUND);
    assert_eq!(gateway.backend(backend.id).await.unwrap(), backend);
}

#[tokio::test]
async fn test_heartbeat_without_agent_header() {
    let gateway = TestGateway::new();
    let response = gateway.server.post("/api/v1/agent/heartbeat").await;
    assert_error_response!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_heartbeat_makes_ready_backend_eligible() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com")
        .admin(AdminState::Enabled)
        .node(NodeState::Ready)
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;

    let eligible = || async {
        let body: Value = gateway
            .server
            .get("/api/v1/backends")
            .add_query_param("eligible", "true")
            .await
            .json();
        body.as_array().unwrap().len()
    };

    assert_eq!(eligible().await, 0, "never reported");

    gateway
        .server
        .post("/api/v1/agent/heartbeat")
        .add_header(AGENT_REF, HeaderValue::from_static("node-1"))
        .await
        .assert_status_ok();

    assert_eq!(eligible().await, 1);
    assert!(gateway.backend(backend.id).await.unwrap().agent_heartbeat.is_some());
}

#[tokio::test]
async fn test_heartbeat_returns_settings() {
    let gateway = TestGateway::new();
    let backend = BackendSeed::new("https://bbb1.example.com")
        .agent_ref("node-1")
        .insert(&gateway.store)
        .await;

    gateway
        .server
        .patch(&format!("/api/v1/backends/{}", backend.id))
        .json(&serde_json::json!({"settings": {"load_factor": 2.5}}))
        .await
        .assert_status_ok();

    let body: Value = gateway
        .server
        .post("/api/v1/agent/heartbeat")
        .add_header(AGENT_REF, HeaderValue::from_static("node-1"))
        .await
        .json();
    assert_eq!(body["settings"]["load_factor"], 2.5);
}
