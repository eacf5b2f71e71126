/**
 * Backend Handler Types
 *
 * Request types of the operator backend API and their validation.
 */

use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::store::{AdminState, BackendSettings};

/// Register backend request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterBackendRequest {
    /// API base URL, e.g. `https://bbb1.example.com/bigbluebutton`
    pub host: String,
    /// Shared API secret
    pub secret: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Agent identity to associate with the backend
    #[serde(default)]
    pub agent_ref: Option<String>,
    #[serde(default)]
    pub settings: Option<BackendSettings>,
}

/// Update backend request
///
/// Absent fields are left untouched. An empty `agent_ref` removes the
/// association.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct UpdateBackendRequest {
    #[serde(default)]
    pub admin_state: Option<AdminState>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub agent_ref: Option<String>,
    #[serde(default)]
    pub settings: Option<BackendSettings>,
}

/// Query of the backend listing
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListBackendsQuery {
    /// Only backends eligible for traffic right now
    #[serde(default)]
    pub eligible: bool,
    /// Comma separated tags that must all be present
    #[serde(default)]
    pub tag: Option<String>,
}

impl ListBackendsQuery {
    pub fn required_tags(&self) -> Vec<&str> {
        self.tag
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A host must be an absolute http(s) URL
pub fn validate_host(host: &str) -> Result<(), BackendError> {
    if host.trim().is_empty() {
        return Err(BackendError::validation("host", "must not be empty"));
    }
    let url = reqwest::Url::parse(host)
        .map_err(|e| BackendError::validation("host", format!("not a valid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(BackendError::validation("host", "must be an absolute http(s) URL"));
    }
    Ok(())
}

pub fn validate_secret(secret: &str) -> Result<(), BackendError> {
    if secret.is_empty() {
        return Err(BackendError::validation("secret", "must not be empty"));
    }
    Ok(())
}

/// Normalize an optional agent reference; blank means none
pub fn normalize_agent_ref(agent_ref: Option<String>) -> Option<String> {
    agent_ref
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
