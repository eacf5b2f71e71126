//! bbbgate - Main Library
//!
//! bbbgate is a gateway in front of a cluster of BigBlueButton conferencing
//! backends. It keeps track of which backends exist and whether they can
//! take traffic, and it combines the API replies of several backends into
//! the single reply a client expects.
//!
//! # Module Structure
//!
//! - **`shared`** - Code without server dependencies
//!   - Response model of the conferencing API (decode, encode, merge)
//!   - Merge engine folding many backend replies into one
//!   - Configuration types
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Backend state, its state machine and the transactional store
//!   - Agent heartbeat endpoint
//!   - Operator API for managing backends
//!   - Backend client, fan-out and reconciliation
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (axum, tokio, sqlx, reqwest); enabled by
//!   default
//!
//! # Usage
//!
//! ```rust,no_run
//! use bbbgate::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await?;
//! // Serve `app` with axum
//! # Ok(())
//! # }
//! ```
//!
//! Merging replies does not need the server:
//!
//! ```rust
//! use bbbgate::shared::bbb::{Envelope, GetMeetingsResponse, MeetingList, Reply};
//! use bbbgate::shared::{merge_replies, SourcedReply};
//!
//! let a = GetMeetingsResponse::new(Envelope::success(), MeetingList::default());
//! let b = GetMeetingsResponse::new(Envelope::success(), MeetingList::default());
//! let merged = merge_replies(vec![
//!     SourcedReply::new("bbb1", a),
//!     SourcedReply::new("bbb2", b),
//! ])
//! .unwrap();
//! assert_eq!(merged.kind().resource(), "getMeetings");
//! ```
//!
//! # Error Handling
//!
//! - `shared::error` - decode, encode and merge failures
//! - `backend::store::StoreError` - persistence failures
//! - `backend::error::BackendError` - HTTP facing errors with status codes

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
