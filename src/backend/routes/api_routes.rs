/**
 * API Routes
 *
 * # Routes
 *
 * ## Gateway
 * - `GET /health` - Gateway liveness
 *
 * ## Agents
 * - `POST /api/v1/agent/heartbeat` - Heartbeat of the agent named by
 *   `X-Agent-Ref`
 *
 * ## Backends
 * - `GET /api/v1/backends` - List backends
 * - `POST /api/v1/backends` - Register a backend
 * - `GET /api/v1/backends/{id}` - Show a backend
 * - `PATCH /api/v1/backends/{id}` - Update a backend
 * - `DELETE /api/v1/backends/{id}` - Deregister a backend
 * - `POST /api/v1/backends/{id}/stop` - Stop a backend
 *
 * ## Cluster
 * - `GET /api/v1/cluster/{resource}` - Collection call merged across
 *   eligible backends
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::agents::handle_agent_heartbeat;
use crate::backend::backends::{
    delete_backend, get_backend, health, list_backends, register_backend, stop_backend,
    update_backend,
};
use crate::backend::cluster::cluster_call;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
///
/// # Authentication
///
/// None of the routes authenticate callers. Operator and agent access is
/// expected to be restricted in front of the gateway.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        // Agent endpoints
        .route("/api/v1/agent/heartbeat", post(handle_agent_heartbeat))
        // Backend management endpoints
        .route("/api/v1/backends", get(list_backends).post(register_backend))
        .route(
            "/api/v1/backends/{id}",
            get(get_backend).patch(update_backend).delete(delete_backend),
        )
        .route("/api/v1/backends/{id}/stop", post(stop_backend))
        // Cluster-wide calls
        .route("/api/v1/cluster/{resource}", get(cluster_call))
}
