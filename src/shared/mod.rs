//! Shared Module
//!
//! Types that do not depend on the server runtime: the conferencing API
//! response model, the merge engine, error types and configuration.
//!
//! # Overview
//!
//! Everything here is synchronous and free of I/O so it can be used from
//! the HTTP layer, the cluster client and tests alike.

/// Conferencing API response model
pub mod bbb;

/// Shared error types
pub mod error;

/// Folding replies of several backends
pub mod merge;

/// Gateway configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use bbb::{Reply, Response, ResponseKind};
pub use config::{ConfigError, GatewayConfig, GatewayConfigBuilder};
pub use error::{DecodeError, EncodeError, MergeError};
pub use merge::{merge_replies, AggregateError, SourcedReply};
