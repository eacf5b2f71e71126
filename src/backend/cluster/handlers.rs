/**
 * Cluster Handlers
 *
 * Read-only API calls answered by the whole cluster.
 *
 * # Routes
 *
 * - `GET /api/v1/cluster/{resource}` - send `resource` with the request's
 *   query string to every eligible backend and return the merged reply
 */

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::backend::cluster::fanout::broadcast;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::{finish, BackendFilter};
use crate::shared::bbb::ResponseKind;

/// Operations whose replies can be combined across backends
pub const COLLECTION_KINDS: [ResponseKind; 3] = [
    ResponseKind::GetMeetings,
    ResponseKind::GetRecordings,
    ResponseKind::GetRecordingTextTracks,
];

/// Parse a resource name into an operation that can be fanned out
pub fn collection_kind(resource: &str) -> Result<ResponseKind, BackendError> {
    let kind: ResponseKind = resource
        .parse()
        .map_err(|e: String| BackendError::validation("resource", e))?;
    if !COLLECTION_KINDS.contains(&kind) {
        return Err(BackendError::validation(
            "resource",
            format!("{} replies can't be combined across backends", kind),
        ));
    }
    Ok(kind)
}

/// Fan a collection call out to all eligible backends
///
/// # Errors
///
/// * `400 Bad Request` - unknown or non-collection resource
/// * `502 Bad Gateway` - no backend answered, or the replies disagree
pub async fn cluster_call(
    State(app_state): State<AppState>,
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, BackendError> {
    let kind = collection_kind(&resource)?;

    let mut tx = app_state.store.begin().await?;
    let outcome = tx.list_backends(&BackendFilter::all()).await;
    let backends = finish(tx, outcome).await?;

    let now = Utc::now();
    let eligible: Vec<_> = backends
        .into_iter()
        .filter(|backend| backend.is_eligible(now, app_state.config.liveness_threshold))
        .collect();
    tracing::debug!(resource = %kind, backends = eligible.len(), "Fanning out");

    let reply = broadcast(
        &app_state.client,
        &eligible,
        kind,
        query.as_deref().unwrap_or(""),
        app_state.config.request_timeout,
    )
    .await?;

    let body = reply
        .encode()
        .map_err(|e| {
            BackendError::handler(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode merged reply: {}", e),
            )
        })?;
    Ok(([(header::CONTENT_TYPE, reply.response.content_type())], body).into_response())
}
