//! API integration tests
//!
//! Integration tests for all API endpoints

mod backends_test;
mod heartbeat_test;
