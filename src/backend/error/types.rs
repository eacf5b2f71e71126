/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers.
 * Every lower level error (store, merge, fan-out) converts into a
 * `BackendError` with an HTTP status attached.
 *
 * # Error Categories
 *
 * ## Request Errors
 *
 * - Missing or malformed headers (e.g. `X-Agent-Ref`)
 * - Invalid registration or update payloads
 *
 * ## Lookup Errors
 *
 * - Unknown backend id
 * - Heartbeat from an agent that is not associated with any backend
 *
 * ## Upstream Errors
 *
 * - Backend replies that cannot be merged
 * - No backend answered a fanned out call
 *
 * ## Store Errors
 *
 * - Database or transaction failures
 */

use thiserror::Error;
use axum::http::StatusCode;

use crate::backend::cluster::FanOutError;
use crate::backend::store::StoreError;
use crate::shared::AggregateError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use bbbgate::backend::error::BackendError;
///
/// let err = BackendError::not_found("No backend is associated with agent `a1`");
/// assert_eq!(err.status_code().as_u16(), 404);
///
/// let err = BackendError::validation("host", "must be an absolute http(s) URL");
/// assert_eq!(err.status_code().as_u16(), 400);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status (e.g. missing headers)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The addressed resource does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Request payload failed validation
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Backend replies could not be combined
    #[error(transparent)]
    MergeError(#[from] AggregateError),

    /// Fanned out call produced no usable reply
    #[error(transparent)]
    FanOutError(#[from] FanOutError),

    /// Persistence failure
    #[error(transparent)]
    StoreError(#[from] StoreError),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new validation error
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the offending request field
    /// * `message` - Error message
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `NotFound` - 404 Not Found
    /// - `ValidationError` - 400 Bad Request
    /// - `MergeError`, `FanOutError` - 502 Bad Gateway
    /// - `StoreError` - 404 for missing records, 400 for duplicates,
    ///   500 otherwise
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::MergeError(_) | Self::FanOutError(_) => StatusCode::BAD_GATEWAY,
            Self::StoreError(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Duplicate { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error message
    ///
    /// Database details are not exposed to clients.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::NotFound { message } => message.clone(),
            Self::ValidationError { field, message } => format!("{}: {}", field, message),
            Self::MergeError(err) => err.to_string(),
            Self::FanOutError(err) => err.to_string(),
            Self::StoreError(err) => match err {
                StoreError::NotFound(_) | StoreError::Duplicate { .. } => err.to_string(),
                _ => "Internal storage error".to_string(),
            },
        }
    }
}
