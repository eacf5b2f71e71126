//! Gateway test fixtures
//!
//! Builds the router on an in-memory store and seeds backends directly
//! into that store.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bbbgate::backend::cluster::BackendClient;
use bbbgate::backend::routes::create_router;
use bbbgate::backend::server::state::AppState;
use bbbgate::backend::store::{AdminState, BackendState, MemoryStore, NodeState, Store};
use bbbgate::shared::GatewayConfig;

/// A test server and the store behind it
pub struct TestGateway {
    pub server: TestServer,
    pub store: MemoryStore,
}

impl TestGateway {
    /// Gateway with default configuration
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let store = MemoryStore::new();
        let client = BackendClient::new(Duration::from_secs(2)).expect("Failed to build backend client");
        let app_state = AppState::new(Arc::new(store.clone()), config, client);
        let server = TestServer::new(create_router(app_state)).expect("Failed to start test server");
        Self { server, store }
    }

    /// Current stored state of one backend
    pub async fn backend(&self, id: Uuid) -> Option<BackendState> {
        self.store.snapshot().await.into_iter().find(|b| b.id == id)
    }
}

/// Builder for backends inserted straight into a store
pub struct BackendSeed {
    state: BackendState,
}

impl BackendSeed {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            state: BackendState::new(host, "secret", AdminState::Disabled, Utc::now()),
        }
    }

    /// Enabled, ready and with a heartbeat from `now`
    pub fn eligible(host: impl Into<String>) -> Self {
        Self::new(host)
            .admin(AdminState::Enabled)
            .node(NodeState::Ready)
            .heartbeat(Utc::now())
    }

    pub fn admin(mut self, admin: AdminState) -> Self {
        self.state.admin_state = admin;
        self
    }

    pub fn node(mut self, node: NodeState) -> Self {
        self.state.node_state = node;
        self
    }

    pub fn heartbeat(mut self, at: DateTime<Utc>) -> Self {
        self.state.agent_heartbeat = Some(at);
        self
    }

    pub fn agent_ref(mut self, agent_ref: impl Into<String>) -> Self {
        self.state.agent_ref = Some(agent_ref.into());
        self
    }

    /// Registration time; listings are ordered by it
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.state.created_at = at;
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.state.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Insert into `store` and return the stored state
    pub async fn insert(self, store: &dyn Store) -> BackendState {
        let mut tx = store.begin().await.expect("Failed to begin transaction");
        tx.insert_backend(&self.state).await.expect("Failed to insert backend");
        tx.commit().await.expect("Failed to commit");
        self.state
    }
}
