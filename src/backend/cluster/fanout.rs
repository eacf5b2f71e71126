//! Fan-out
//!
//! Runs one call per backend concurrently, each under its own timeout,
//! then merges the replies that came back. Backends that fail or time out
//! are logged and left out; the merge only starts once every call has
//! finished and is skipped when none succeeded.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use thiserror::Error;

use crate::backend::cluster::client::BackendClient;
use crate::backend::store::BackendState;
use crate::shared::bbb::{Reply, ResponseKind};
use crate::shared::{merge_replies, AggregateError, SourcedReply};

/// Fan-out failures
#[derive(Debug, Error)]
pub enum FanOutError {
    #[error("None of the {attempted} backends returned a usable reply")]
    NoReplies { attempted: usize },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Call every backend and merge the successful replies
///
/// Replies are merged in the order of `backends`, independent of which
/// call finished first.
///
/// # Arguments
///
/// * `backends` - Backends to call
/// * `timeout` - Per call timeout
/// * `call` - Produces the call for one backend
pub async fn fan_out<F, Fut, E>(
    backends: &[BackendState],
    timeout: Duration,
    call: F,
) -> Result<Reply, FanOutError>
where
    F: Fn(BackendState) -> Fut,
    Fut: Future<Output = Result<Reply, E>>,
    E: Display,
{
    let calls = backends.iter().map(|backend| {
        let pending = call(backend.clone());
        async move { (backend, tokio::time::timeout(timeout, pending).await) }
    });
    let results = join_all(calls).await;

    let mut replies = Vec::with_capacity(results.len());
    for (backend, result) in results {
        match result {
            Ok(Ok(reply)) => replies.push(SourcedReply::new(backend.id.to_string(), reply)),
            Ok(Err(err)) => {
                tracing::warn!(backend_id = %backend.id, host = %backend.host, error = %err, "Backend call failed");
            }
            Err(_) => {
                tracing::warn!(
                    backend_id = %backend.id,
                    host = %backend.host,
                    timeout_ms = timeout.as_millis() as u64,
                    "Backend call timed out"
                );
            }
        }
    }

    if replies.is_empty() {
        return Err(FanOutError::NoReplies {
            attempted: backends.len(),
        });
    }

    Ok(merge_replies(replies)?)
}

/// Send the same GET call to every backend and merge the replies
pub async fn broadcast(
    client: &BackendClient,
    backends: &[BackendState],
    kind: ResponseKind,
    query: &str,
    timeout: Duration,
) -> Result<Reply, FanOutError> {
    fan_out(backends, timeout, |backend| {
        let client = client.clone();
        let query = query.to_string();
        async move { client.call(&backend, kind, &query).await }
    })
    .await
}
