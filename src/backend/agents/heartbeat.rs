//! Agent Heartbeat
//!
//! A node agent reports in periodically. The report only refreshes the
//! heartbeat timestamp of the backend associated with the agent; liveness
//! and eligibility are derived from it at decision time.
//!
//! Unknown agents are rejected, never auto-registered: associating an
//! agent with a backend is an operator action.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::backend::error::BackendError;
use crate::backend::store::{finish, AgentHeartbeat, BackendFilter, Store, StoreError, StoreTx};

/// Heartbeat failures
#[derive(Debug, Error)]
pub enum HeartbeatError {
    #[error("No backend is associated with agent `{0}`")]
    UnknownAgent(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<HeartbeatError> for BackendError {
    fn from(err: HeartbeatError) -> Self {
        match err {
            HeartbeatError::UnknownAgent(_) => BackendError::not_found(err.to_string()),
            HeartbeatError::Store(err) => BackendError::StoreError(err),
        }
    }
}

/// Record a heartbeat of the agent `agent_ref` at `now`
///
/// Runs in one transaction: the lookup and the timestamp update commit
/// together, and every failure rolls back.
///
/// # Arguments
///
/// * `store` - Backend store
/// * `agent_ref` - Authenticated agent identity
/// * `now` - Heartbeat timestamp
///
/// # Returns
///
/// The backend id, the recorded timestamp and the settings the agent
/// should apply
pub async fn agent_heartbeat(
    store: &dyn Store,
    agent_ref: &str,
    now: DateTime<Utc>,
) -> Result<AgentHeartbeat, HeartbeatError> {
    let mut tx = store.begin().await?;
    let outcome = record_heartbeat(tx.as_mut(), agent_ref, now).await;
    let heartbeat = finish(tx, outcome).await?;

    tracing::debug!(backend_id = %heartbeat.backend_id, agent_ref, "Agent heartbeat recorded");
    Ok(heartbeat)
}

async fn record_heartbeat(
    tx: &mut dyn StoreTx,
    agent_ref: &str,
    now: DateTime<Utc>,
) -> Result<AgentHeartbeat, HeartbeatError> {
    let backend = tx
        .find_backend(&BackendFilter::by_agent_ref(agent_ref))
        .await?
        .ok_or_else(|| {
            tracing::warn!(agent_ref, "Heartbeat from unassociated agent");
            HeartbeatError::UnknownAgent(agent_ref.to_string())
        })?;

    tx.touch_heartbeat(backend.id, now).await?;

    Ok(AgentHeartbeat {
        backend_id: backend.id,
        heartbeat: now,
        settings: backend.settings,
    })
}
