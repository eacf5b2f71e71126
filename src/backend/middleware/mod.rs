//! Middleware Module
//!
//! Request processing shared by handlers.
//!
//! # Architecture
//!
//! - **`agent_ref`** - extractor for the agent identity forwarded by the
//!   authentication layer in the `X-Agent-Ref` header
//!
//! # Example
//!
//! ```rust,no_run
//! use bbbgate::backend::middleware::AgentRef;
//!
//! async fn handler(AgentRef(agent_ref): AgentRef) -> String {
//!     agent_ref
//! }
//! ```

pub mod agent_ref;

pub use agent_ref::{AgentRef, AGENT_REF_HEADER};
