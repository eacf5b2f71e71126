//! Property-based tests

mod liveness_proptest;
mod merge_proptest;
