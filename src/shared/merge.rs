//! Merge Engine
//!
//! Folds the replies collected from several backends into one logical
//! reply. The engine is a pure function: no I/O, no shared state.
//!
//! - no replies: [`AggregateError::Empty`]
//! - one reply: returned as is, merge is never invoked
//! - more: the first reply seeds the accumulator, the others are merged in
//!   order; the first failure aborts the fold and the partial accumulator
//!   is dropped

use thiserror::Error;

use crate::shared::bbb::Reply;
use crate::shared::error::MergeError;

/// A reply tagged with the backend it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedReply {
    /// Backend identity used in diagnostics
    pub backend: String,
    pub reply: Reply,
}

impl SourcedReply {
    pub fn new(backend: impl Into<String>, reply: impl Into<Reply>) -> Self {
        Self {
            backend: backend.into(),
            reply: reply.into(),
        }
    }
}

/// Failure to fold a set of replies
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregateError {
    #[error("No replies to merge")]
    Empty,

    /// Merging the reply of `offending` into the accumulated replies of
    /// `merged` failed at fold step `step` (1 based).
    #[error("Merging reply of {offending} into [{prefix}] failed at step {step}: {source}", prefix = .merged.join(", "))]
    Merge {
        step: usize,
        merged: Vec<String>,
        offending: String,
        #[source]
        source: MergeError,
    },
}

/// Fold backend replies into one reply
///
/// # Arguments
///
/// * `replies` - Replies in the order they should be combined
///
/// # Returns
///
/// The merged reply, or the first error with the backends involved
pub fn merge_replies(replies: Vec<SourcedReply>) -> Result<Reply, AggregateError> {
    let mut replies = replies.into_iter();
    let seed = replies.next().ok_or(AggregateError::Empty)?;

    let mut merged = vec![seed.backend];
    let mut accumulator = seed.reply;

    for (index, next) in replies.enumerate() {
        let step = index + 1;
        if let Err(source) = accumulator.merge(next.reply) {
            tracing::warn!(
                step,
                merged = ?merged,
                offending = %next.backend,
                error = %source,
                "Failed to merge backend replies"
            );
            return Err(AggregateError::Merge {
                step,
                merged,
                offending: next.backend,
                source,
            });
        }
        merged.push(next.backend);
    }

    tracing::debug!(backends = merged.len(), kind = %accumulator.kind(), "Merged backend replies");
    Ok(accumulator)
}
