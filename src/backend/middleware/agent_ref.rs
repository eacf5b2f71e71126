/**
 * Agent Reference Extractor
 *
 * Node agents are authenticated by an external layer in front of the
 * gateway, which forwards the authenticated identity in the
 * `X-Agent-Ref` header. This extractor reads that header and hands the
 * reference to handlers.
 *
 * Requests without the header (or with an empty / non-UTF-8 value) are
 * rejected with 400 Bad Request.
 */

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};

use crate::backend::error::BackendError;

/// Header carrying the authenticated agent identity
pub const AGENT_REF_HEADER: &str = "x-agent-ref";

/// Axum extractor for the calling agent's reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentRef(pub String);

impl<S> FromRequestParts<S> for AgentRef
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agent_ref = parts
            .headers
            .get(AGENT_REF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                tracing::warn!("Missing X-Agent-Ref header");
                BackendError::handler(StatusCode::BAD_REQUEST, "Missing X-Agent-Ref header")
            })?;

        Ok(AgentRef(agent_ref.to_string()))
    }
}
