/**
 * Backend Handlers
 *
 * Operator API for registering and managing conferencing backends.
 *
 * # Routes
 *
 * - `GET /api/v1/backends` - list (`?eligible=true`, `?tag=a,b`)
 * - `POST /api/v1/backends` - register
 * - `GET /api/v1/backends/{id}` - show
 * - `PATCH /api/v1/backends/{id}` - update admin state, tags, secret,
 *   agent reference or settings
 * - `POST /api/v1/backends/{id}/stop` - take the node out of service
 * - `DELETE /api/v1/backends/{id}` - deregister
 *
 * Every handler runs in a single store transaction that commits only when
 * the handler succeeds.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::backends::types::{
    normalize_agent_ref, validate_host, validate_secret, ListBackendsQuery,
    RegisterBackendRequest, UpdateBackendRequest,
};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::{
    finish, AdminState, BackendFilter, BackendState, StoreError, StoreTx,
};

/// Gateway liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// List registered backends
///
/// Eligibility is evaluated against the current time on every request.
pub async fn list_backends(
    State(app_state): State<AppState>,
    Query(query): Query<ListBackendsQuery>,
) -> Result<Json<Vec<BackendState>>, BackendError> {
    let mut tx = app_state.store.begin().await?;
    let outcome = tx.list_backends(&BackendFilter::all()).await;
    let backends = finish(tx, outcome).await?;

    let now = Utc::now();
    let threshold = app_state.config.liveness_threshold;
    let tags = query.required_tags();

    let backends = backends
        .into_iter()
        .filter(|backend| !query.eligible || backend.is_eligible(now, threshold))
        .filter(|backend| backend.has_tags(&tags))
        .collect();

    Ok(Json(backends))
}

/// Register a backend
///
/// The admin state follows the configured registration policy; the node
/// starts `stopped` until reconciliation reaches it.
///
/// # Errors
///
/// * `400 Bad Request` - invalid host or secret, or the agent reference is
///   already associated with another backend
pub async fn register_backend(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterBackendRequest>,
) -> Result<(StatusCode, Json<BackendState>), BackendError> {
    validate_host(&request.host)?;
    validate_secret(&request.secret)?;

    let admin_state = if app_state.config.enable_on_register {
        AdminState::Enabled
    } else {
        AdminState::Disabled
    };
    let mut state = BackendState::new(request.host, request.secret, admin_state, Utc::now());
    state.tags = request.tags;
    state.agent_ref = normalize_agent_ref(request.agent_ref);
    if let Some(settings) = request.settings {
        state.settings = settings;
    }

    let mut tx = app_state.store.begin().await?;
    let outcome = insert_backend(tx.as_mut(), &state).await;
    finish(tx, outcome).await?;

    tracing::info!(backend_id = %state.id, host = %state.host, admin_state = %state.admin_state, "Backend registered");
    Ok((StatusCode::CREATED, Json(state)))
}

async fn insert_backend(tx: &mut dyn StoreTx, state: &BackendState) -> Result<(), BackendError> {
    if let Some(agent_ref) = &state.agent_ref {
        ensure_agent_ref_free(tx, agent_ref, state.id).await?;
    }
    tx.insert_backend(state).await?;
    Ok(())
}

async fn ensure_agent_ref_free(
    tx: &mut dyn StoreTx,
    agent_ref: &str,
    owner: Uuid,
) -> Result<(), BackendError> {
    match tx.find_backend(&BackendFilter::by_agent_ref(agent_ref)).await? {
        Some(other) if other.id != owner => Err(BackendError::validation(
            "agent_ref",
            format!("already associated with backend {}", other.id),
        )),
        _ => Ok(()),
    }
}

/// Show one backend
pub async fn get_backend(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackendState>, BackendError> {
    let mut tx = app_state.store.begin().await?;
    let outcome = find_existing(tx.as_mut(), id).await;
    Ok(Json(finish(tx, outcome).await?))
}

async fn find_existing(tx: &mut dyn StoreTx, id: Uuid) -> Result<BackendState, BackendError> {
    tx.find_backend(&BackendFilter::by_id(id))
        .await?
        .ok_or_else(|| BackendError::StoreError(StoreError::NotFound(id)))
}

/// Update a backend
pub async fn update_backend(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBackendRequest>,
) -> Result<Json<BackendState>, BackendError> {
    if let Some(secret) = &request.secret {
        validate_secret(secret)?;
    }

    let mut tx = app_state.store.begin().await?;
    let outcome = apply_update(tx.as_mut(), id, request, Utc::now()).await;
    let state = finish(tx, outcome).await?;

    tracing::info!(backend_id = %state.id, admin_state = %state.admin_state, "Backend updated");
    Ok(Json(state))
}

async fn apply_update(
    tx: &mut dyn StoreTx,
    id: Uuid,
    request: UpdateBackendRequest,
    now: DateTime<Utc>,
) -> Result<BackendState, BackendError> {
    let mut state = find_existing(tx, id).await?;

    match request.admin_state {
        Some(AdminState::Enabled) => state.enable(now),
        Some(AdminState::Disabled) => state.disable(now),
        None => {}
    }
    if let Some(tags) = request.tags {
        state.tags = tags;
    }
    if let Some(secret) = request.secret {
        state.secret = secret;
    }
    if let Some(settings) = request.settings {
        state.settings = settings;
    }
    if request.agent_ref.is_some() {
        state.agent_ref = normalize_agent_ref(request.agent_ref);
        if let Some(agent_ref) = &state.agent_ref {
            ensure_agent_ref_free(tx, agent_ref, state.id).await?;
        }
    }
    state.updated_at = now;

    tx.update_backend(&state).await?;
    Ok(state)
}

/// Stop a backend
///
/// The node is marked `stopped` and administratively disabled, so it stays
/// out of rotation until an operator enables it again.
pub async fn stop_backend(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackendState>, BackendError> {
    let mut tx = app_state.store.begin().await?;
    let outcome = apply_stop(tx.as_mut(), id, Utc::now()).await;
    let state = finish(tx, outcome).await?;

    tracing::info!(backend_id = %state.id, "Backend stopped");
    Ok(Json(state))
}

async fn apply_stop(
    tx: &mut dyn StoreTx,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<BackendState, BackendError> {
    let mut state = find_existing(tx, id).await?;
    state.stop(now);
    tx.update_backend(&state).await?;
    Ok(state)
}

/// Deregister a backend
pub async fn delete_backend(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let mut tx = app_state.store.begin().await?;
    let outcome = tx.delete_backend(id).await;
    finish(tx, outcome).await?;

    tracing::info!(backend_id = %id, "Backend deregistered");
    Ok(StatusCode::NO_CONTENT)
}
