//! Node agent protocol
//!
//! - **`heartbeat`** - the transactional heartbeat operation
//! - **`handlers`** - its HTTP endpoint

pub mod handlers;
pub mod heartbeat;

pub use handlers::handle_agent_heartbeat;
pub use heartbeat::{agent_heartbeat, HeartbeatError};
