//! Operator backend API
//!
//! - **`types`** - request bodies, query parameters and their validation
//! - **`handlers`** - registration, listing, updates, stop and removal

pub mod handlers;
pub mod types;

pub use handlers::{
    delete_backend, get_backend, health, list_backends, register_backend, stop_backend,
    update_backend,
};
pub use types::{ListBackendsQuery, RegisterBackendRequest, UpdateBackendRequest};
