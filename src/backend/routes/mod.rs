//! Route Configuration Module
//!
//! This module configures all HTTP routes for the gateway.
//!
//! - **`router`** - Main router creation and middleware
//! - **`api_routes`** - Agent, backend and cluster endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use bbbgate::backend::cluster::BackendClient;
//! use bbbgate::backend::routes::create_router;
//! use bbbgate::backend::server::state::AppState;
//! use bbbgate::backend::store::MemoryStore;
//! use bbbgate::shared::GatewayConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BackendClient::new(Duration::from_secs(5))?;
//! let app_state = AppState::new(Arc::new(MemoryStore::new()), GatewayConfig::default(), client);
//! let router = create_router(app_state);
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
