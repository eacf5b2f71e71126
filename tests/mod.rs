//! Test suite for bbbgate
//!
//! This module organizes all integration and property tests

#![cfg(feature = "ssr")]

#[macro_use]
pub mod common;
pub mod property;
