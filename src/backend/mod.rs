//! Backend Module
//!
//! Server-side code of the gateway, only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`store`** - [`store::BackendState`] records and their transactional
//!   persistence
//! - **`agents`** - heartbeats reported by node agents
//! - **`backends`** - operator API for registering and managing backends
//! - **`cluster`** - backend client, fan-out and reconciliation
//! - **`middleware`** - request extractors
//! - **`error`** - HTTP error type
//! - **`routes`** - route table
//! - **`server`** - configuration, state and startup
//!
//! # Request Flow
//!
//! ```text
//! HTTP request
//!   -> routes (TraceLayer)
//!   -> extractors (State<AppState>, AgentRef, Json, Path)
//!   -> handler: store.begin() ... finish(tx, outcome)
//!   -> Result<_, BackendError> -> JSON response
//! ```

pub mod agents;
pub mod backends;
pub mod cluster;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod store;

pub use error::BackendError;
pub use server::create_app;
