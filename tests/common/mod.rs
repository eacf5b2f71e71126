//! Common test utilities and helpers
//!
//! - Gateway fixtures on the in-memory store
//! - PostgreSQL fixtures
//! - Custom assertion macros

pub mod database;
pub mod fixtures;

pub use database::*;
pub use fixtures::*;
