/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct holds:
 * - The backend store (PostgreSQL or in-memory) as a trait object
 * - The gateway configuration
 * - The HTTP client used to call backends
 *
 * Store and configuration are behind `Arc`, so cloning the state per request is cheap. No
 * lock is held between requests; all mutation goes through store
 * transactions.
 *
 * # Example
 *
 * ```rust,no_run
 * use bbbgate::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let threshold = state.config.liveness_threshold;
 *     // ...
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::cluster::BackendClient;
use crate::backend::store::Store;
use crate::shared::GatewayConfig;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Backend state persistence
    pub store: Arc<dyn Store>,

    /// Gateway configuration
    pub config: Arc<GatewayConfig>,

    /// Client for fan-out calls; cloning shares its connection pool
    pub client: BackendClient,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: GatewayConfig, client: BackendClient) -> Self {
        Self {
            store,
            config: Arc::new(config),
            client,
        }
    }
}

/// Allows handlers to extract `State<Arc<dyn Store>>` directly
impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

/// Allows handlers to extract `State<Arc<GatewayConfig>>` directly
impl FromRef<AppState> for Arc<GatewayConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
