/**
 * Agent Handlers
 *
 * HTTP endpoints called by node agents.
 *
 * # Routes
 *
 * - `POST /api/v1/agent/heartbeat` - record a heartbeat
 *
 * # Responses
 *
 * - `200 OK` with the `AgentHeartbeat` JSON
 * - `400 Bad Request` when the `X-Agent-Ref` header is missing
 * - `404 Not Found` when no backend is associated with the agent
 */

use axum::{extract::State, Json};
use chrono::Utc;

use crate::backend::agents::heartbeat::agent_heartbeat;
use crate::backend::error::BackendError;
use crate::backend::middleware::AgentRef;
use crate::backend::server::state::AppState;
use crate::backend::store::AgentHeartbeat;

/// Record a heartbeat of the calling agent
pub async fn handle_agent_heartbeat(
    State(app_state): State<AppState>,
    AgentRef(agent_ref): AgentRef,
) -> Result<Json<AgentHeartbeat>, BackendError> {
    let heartbeat = agent_heartbeat(app_state.store.as_ref(), &agent_ref, Utc::now()).await?;
    Ok(Json(heartbeat))
}
