//! Backend State
//!
//! The gateway's record of one registered conferencing backend: where it
//! lives, how to sign requests for it, the operator's intent (admin state),
//! what reconciliation last observed (node state) and when its agent last
//! reported in.
//!
//! # State Machine
//!
//! ```text
//!             reconcile ok                 operator stop
//!   error  ----------------->  ready  ------------------->  stopped
//!          <-----------------         <-------------------
//!             reconcile fail            enable + reconcile ok
//! ```
//!
//! The admin state (`enabled` / `disabled`) is operator-only and orthogonal
//! to the node state, except that an operator stop also disables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operator intent for a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    Enabled,
    #[default]
    Disabled,
}

impl AdminState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown admin state `{}`", other)),
        }
    }
}

/// Observed state of a backend node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Ready,
    #[default]
    Stopped,
    Error,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Self::Ready),
            "stopped" => Ok(Self::Stopped),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown node state `{}`", other)),
        }
    }
}

/// Effective configuration handed to a backend's agent
///
/// Keys the gateway does not interpret are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Relative weight when ranking backends by load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_factor: Option<f64>,
    /// Maximum number of concurrent meetings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_meetings: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Heartbeat acknowledgement returned to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentHeartbeat {
    pub backend_id: Uuid,
    pub heartbeat: DateTime<Utc>,
    pub settings: BackendSettings,
}

/// Persistent state of a registered backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendState {
    pub id: Uuid,
    pub host: String,
    /// Shared API secret, never serialized
    #[serde(skip_serializing)]
    pub secret: String,
    pub admin_state: AdminState,
    pub node_state: NodeState,
    pub last_error: Option<String>,
    pub tags: Vec<String>,
    pub agent_ref: Option<String>,
    pub agent_heartbeat: Option<DateTime<Utc>>,
    pub settings: BackendSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl BackendState {
    /// Create the state of a freshly registered backend
    ///
    /// The node starts `stopped` and without heartbeat, so a new backend is
    /// never eligible until it has been reconciled and its agent reported.
    pub fn new(
        host: impl Into<String>,
        secret: impl Into<String>,
        admin_state: AdminState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            host: host.into(),
            secret: secret.into(),
            admin_state,
            node_state: NodeState::Stopped,
            last_error: None,
            tags: Vec::new(),
            agent_ref: None,
            agent_heartbeat: None,
            settings: BackendSettings::default(),
            created_at: now,
            updated_at: now,
            synced_at: None,
        }
    }

    /// Whether the agent reported within `threshold` before `now`
    ///
    /// A heartbeat stamped after `now` (clock skew between gateway
    /// instances) counts as fresh.
    pub fn is_alive(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match self.agent_heartbeat {
            None => false,
            Some(heartbeat) => match (now - heartbeat).to_std() {
                Ok(age) => age < threshold,
                Err(_) => true,
            },
        }
    }

    /// Whether the backend may receive traffic
    pub fn is_eligible(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.admin_state == AdminState::Enabled
            && self.node_state == NodeState::Ready
            && self.is_alive(now, threshold)
    }

    /// Whether every tag in `required` is present
    pub fn has_tags<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .all(|tag| self.tags.iter().any(|t| t == tag.as_ref()))
    }

    /// Acknowledgement for the agent of this backend
    pub fn heartbeat(&self) -> Option<AgentHeartbeat> {
        self.agent_heartbeat.map(|heartbeat| AgentHeartbeat {
            backend_id: self.id,
            heartbeat,
            settings: self.settings.clone(),
        })
    }

    pub fn enable(&mut self, now: DateTime<Utc>) {
        self.admin_state = AdminState::Enabled;
        self.updated_at = now;
    }

    pub fn disable(&mut self, now: DateTime<Utc>) {
        self.admin_state = AdminState::Disabled;
        self.updated_at = now;
    }

    /// Operator stop: take the node out of service and keep it out
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.node_state = NodeState::Stopped;
        self.admin_state = AdminState::Disabled;
        self.updated_at = now;
    }

    /// Apply a successful reconciliation round
    ///
    /// Returns the previous node state when it changed.
    pub fn record_reconcile_success(&mut self, now: DateTime<Utc>) -> Option<NodeState> {
        let previous = self.node_state;
        self.node_state = match previous {
            NodeState::Error => NodeState::Ready,
            NodeState::Stopped if self.admin_state == AdminState::Enabled => NodeState::Ready,
            state => state,
        };
        self.last_error = None;
        self.synced_at = Some(now);
        self.updated_at = now;
        (previous != self.node_state).then_some(previous)
    }

    /// Apply a failed reconciliation round
    ///
    /// Returns the previous node state when it changed.
    pub fn record_reconcile_failure(
        &mut self,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Option<NodeState> {
        let previous = self.node_state;
        if previous == NodeState::Ready {
            self.node_state = NodeState::Error;
        }
        self.last_error = Some(error.into());
        self.updated_at = now;
        (previous != self.node_state).then_some(previous)
    }
}
