//! Shared Error Types
//!
//! Errors of the response model: decoding backend bytes, encoding replies
//! for the client and merging replies of several backends.
//!
//! # Error Categories
//!
//! - [`DecodeError`] - malformed input (`Syntax`) or well-formed input of
//!   the wrong shape (`Schema`)
//! - [`EncodeError`] - a reply could not be written to its wire format
//! - [`MergeError`] - two replies cannot be combined
//!
//! All errors carry the [`ResponseKind`] they belong to so a log line is
//! enough to tell which API call misbehaved.
//!
//! # Usage
//!
//! ```rust
//! use bbbgate::shared::bbb::ResponseKind;
//! use bbbgate::shared::error::MergeError;
//!
//! let error = MergeError::conflict(ResponseKind::GetMeetings, "returncode", "SUCCESS", "FAILED");
//! assert!(error.to_string().contains("returncode"));
//! ```
use thiserror::Error;

use crate::shared::bbb::ResponseKind;

/// Failure to decode a backend reply
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not well-formed XML/JSON
    #[error("Malformed {kind} reply: {message}")]
    Syntax {
        kind: ResponseKind,
        message: String,
    },

    /// Well-formed, but not the shape expected for `kind`
    #[error("Unexpected {kind} reply shape: {message}")]
    Schema {
        kind: ResponseKind,
        message: String,
    },
}

impl DecodeError {
    /// Create a new syntax error
    pub fn syntax(kind: ResponseKind, message: impl Into<String>) -> Self {
        Self::Syntax {
            kind,
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema(kind: ResponseKind, message: impl Into<String>) -> Self {
        Self::Schema {
            kind,
            message: message.into(),
        }
    }

    /// Operation of the reply that failed to decode
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Syntax { kind, .. } | Self::Schema { kind, .. } => *kind,
        }
    }
}

/// Failure to encode a reply
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Failed to write {kind} reply as XML: {message}")]
    Xml {
        kind: ResponseKind,
        message: String,
    },

    #[error("Failed to write {kind} reply as JSON: {message}")]
    Json {
        kind: ResponseKind,
        message: String,
    },

    /// Opaque payload without content
    #[error("Refusing to encode an empty {kind} payload")]
    EmptyPayload { kind: ResponseKind },
}

impl EncodeError {
    /// Create a new XML serializer error
    pub fn xml(kind: ResponseKind, message: impl Into<String>) -> Self {
        Self::Xml {
            kind,
            message: message.into(),
        }
    }

    /// Create a new JSON serializer error
    pub fn json(kind: ResponseKind, message: impl Into<String>) -> Self {
        Self::Json {
            kind,
            message: message.into(),
        }
    }

    /// Create a new empty payload error
    pub fn empty(kind: ResponseKind) -> Self {
        Self::EmptyPayload { kind }
    }
}

/// Failure to merge two replies
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The two replies can never be merged
    ///
    /// Raised for different variants and for singular replies, regardless
    /// of their content.
    #[error("{left} reply can't be merged with {right} reply")]
    CantBeMerged {
        left: ResponseKind,
        right: ResponseKind,
    },

    /// The replies are mergeable in principle but disagree on a field
    #[error("Conflicting {kind} replies: {field} is `{left}` vs `{right}`")]
    Conflict {
        kind: ResponseKind,
        field: &'static str,
        left: String,
        right: String,
    },
}

impl MergeError {
    /// Create a new unmergeable error
    pub fn cant_be_merged(left: ResponseKind, right: ResponseKind) -> Self {
        Self::CantBeMerged { left, right }
    }

    /// Create a new field conflict error
    pub fn conflict(
        kind: ResponseKind,
        field: &'static str,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            kind,
            field,
            left: left.into(),
            right: right.into(),
        }
    }
}
