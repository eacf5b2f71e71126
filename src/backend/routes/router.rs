/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the store, configuration
///   and backend client
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Fallback
///
/// Unknown routes answer 404 with the JSON error body used by all
/// handlers.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new());

    let router = router.fallback(|| async {
        crate::backend::error::BackendError::not_found("Route not found")
    });

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
