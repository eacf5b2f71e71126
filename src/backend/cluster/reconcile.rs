//! Reconciliation
//!
//! Periodically probes every registered backend with a `getMeetings` call
//! and moves its node state accordingly:
//!
//! | Node state | Probe succeeded                 | Probe failed |
//! |------------|---------------------------------|--------------|
//! | `ready`    | `ready`                         | `error`      |
//! | `error`    | `ready`                         | `error`      |
//! | `stopped`  | `ready` when enabled, else kept | `stopped`    |
//!
//! Probes run concurrently and without an open transaction. Each result is
//! then written in its own transaction on the latest stored record, so an
//! operator change made while probing is not overwritten.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::cluster::client::{BackendClient, ClientError};
use crate::backend::store::{finish, BackendFilter, BackendState, NodeState, Store, StoreError, StoreTx};
use crate::shared::bbb::{Response, ResponseKind, ReturnCode};

/// Outcome of one reconciliation round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Backends probed
    pub probed: usize,
    /// Backends whose probe failed
    pub failed: usize,
    /// Node state changes as `(backend, from, to)`
    pub transitions: Vec<(Uuid, NodeState, NodeState)>,
}

/// Drives backend node states from probe results
pub struct Reconciler {
    store: Arc<dyn Store>,
    client: BackendClient,
    timeout: Duration,
}

impl Reconciler {
    /// # Arguments
    ///
    /// * `store` - Backend state store
    /// * `client` - Client used for probes
    /// * `timeout` - Upper bound of a single probe
    pub fn new(store: Arc<dyn Store>, client: BackendClient, timeout: Duration) -> Self {
        Self {
            store,
            client,
            timeout,
        }
    }

    /// Probe all backends once and record the results
    pub async fn run_once(&self) -> Result<ReconcileReport, StoreError> {
        let tx = self.store.begin().await?;
        let backends = list_all(tx).await?;

        let probes = backends.iter().map(|backend| async move {
            let result = match tokio::time::timeout(self.timeout, self.probe(backend)).await {
                Ok(result) => result,
                Err(_) => Err(format!("probe timed out after {:?}", self.timeout)),
            };
            (backend.id, result)
        });
        let results = join_all(probes).await;

        let mut report = ReconcileReport {
            probed: results.len(),
            ..ReconcileReport::default()
        };
        let now = Utc::now();

        for (id, result) in results {
            if result.is_err() {
                report.failed += 1;
            }
            let mut tx = self.store.begin().await?;
            let outcome = record_probe(tx.as_mut(), id, result, now).await;
            if let Some(transition) = finish(tx, outcome).await? {
                report.transitions.push(transition);
            }
        }

        Ok(report)
    }

    async fn probe(&self, backend: &BackendState) -> Result<(), String> {
        let reply = self
            .client
            .call(backend, ResponseKind::GetMeetings, "")
            .await
            .map_err(|err: ClientError| err.to_string())?;

        match reply.response {
            Response::GetMeetings(res) if res.envelope.returncode == ReturnCode::Success => Ok(()),
            Response::GetMeetings(res) => Err(format!(
                "backend answered {} ({})",
                res.envelope.returncode, res.envelope.message_key
            )),
            other => Err(format!("unexpected {} reply", other.kind())),
        }
    }

    /// Run a round every `interval` until the task is aborted
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(report) => tracing::debug!(
                        probed = report.probed,
                        failed = report.failed,
                        transitions = report.transitions.len(),
                        "Reconciliation round finished"
                    ),
                    Err(err) => tracing::error!(error = %err, "Reconciliation round failed"),
                }
            }
        })
    }
}

async fn list_all(mut tx: Box<dyn StoreTx>) -> Result<Vec<BackendState>, StoreError> {
    let outcome = tx.list_backends(&BackendFilter::all()).await;
    finish(tx, outcome).await
}

async fn record_probe(
    tx: &mut dyn StoreTx,
    id: Uuid,
    result: Result<(), String>,
    now: DateTime<Utc>,
) -> Result<Option<(Uuid, NodeState, NodeState)>, StoreError> {
    // Deregistered while probing
    let Some(mut state) = tx.find_backend(&BackendFilter::by_id(id)).await? else {
        return Ok(None);
    };

    let previous = match &result {
        Ok(()) => state.record_reconcile_success(now),
        Err(err) => {
            tracing::warn!(backend_id = %id, host = %state.host, error = %err, "Backend probe failed");
            state.record_reconcile_failure(err.clone(), now)
        }
    };
    tx.update_backend(&state).await?;

    Ok(previous.map(|from| {
        if state.node_state == NodeState::Ready {
            tracing::info!(backend_id = %id, from = %from, to = %state.node_state, "Backend node state changed");
        } else {
            tracing::warn!(backend_id = %id, from = %from, to = %state.node_state, "Backend node state changed");
        }
        (id, from, state.node_state)
    }))
}
