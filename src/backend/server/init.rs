/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store selection, state creation, background reconciliation and
 * route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the backend store (PostgreSQL or in-memory)
 * 2. Create the backend HTTP client
 * 3. Start the reconciliation task
 * 4. Create and configure the router
 */

use axum::Router;
use thiserror::Error;

use crate::backend::cluster::{BackendClient, ClientError, Reconciler};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::GatewayConfig;

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to open backend store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to create backend client: {0}")]
    Client(#[from] ClientError),
}

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Validated gateway configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests. The reconciliation task
/// runs in the background for the lifetime of the runtime.
pub async fn create_app(config: GatewayConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing bbbgate");

    let store = load_store(&config).await?;
    let client = BackendClient::new(config.request_timeout)?;

    let reconciler = Reconciler::new(store.clone(), client.clone(), config.request_timeout);
    reconciler.spawn(config.reconcile_interval);
    tracing::info!(
        interval_secs = config.reconcile_interval.as_secs(),
        "Reconciliation task started"
    );

    let app_state = AppState::new(store, config, client);
    Ok(create_router(app_state))
}
