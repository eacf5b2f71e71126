//! Cluster Module
//!
//! Talking to the conferencing backends.
//!
//! - **`client`** - signed API calls to a single backend
//! - **`fanout`** - concurrent calls to many backends, merged into one reply
//! - **`reconcile`** - periodic probes driving the node state machine
//! - **`handlers`** - HTTP endpoint answering collection calls cluster-wide

pub mod client;
pub mod fanout;
pub mod handlers;
pub mod reconcile;

pub use client::{BackendClient, ClientError};
pub use fanout::{broadcast, fan_out, FanOutError};
pub use handlers::cluster_call;
pub use reconcile::{ReconcileReport, Reconciler};
