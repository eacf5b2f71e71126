//! Backend Store
//!
//! Transactional persistence of [`BackendState`] records.
//!
//! # Architecture
//!
//! - **`backend_state`** - the record and its state machine
//! - **`memory`** - [`MemoryStore`], used for tests and database-less runs
//! - **`postgres`** - [`PgStore`] on top of a `sqlx` pool
//!
//! Every read and write goes through a [`StoreTx`] obtained from
//! [`Store::begin`]. A transaction that is dropped without
//! [`StoreTx::commit`] leaves the store unchanged, so an early return or a
//! cancelled request never persists half of its work.
//!
//! # Example
//!
//! ```rust,no_run
//! use bbbgate::backend::store::{BackendFilter, MemoryStore, Store};
//!
//! # async fn example() -> Result<(), bbbgate::backend::store::StoreError> {
//! let store = MemoryStore::new();
//! let mut tx = store.begin().await?;
//! let backends = tx.list_backends(&BackendFilter::all()).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub mod backend_state;
pub mod memory;
pub mod postgres;

pub use backend_state::{AdminState, AgentHeartbeat, BackendSettings, BackendState, NodeState};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Backend {0} not found")]
    NotFound(Uuid),

    #[error("A backend with {field} `{value}` already exists")]
    Duplicate { field: &'static str, value: String },

    #[error("Invalid stored value: {0}")]
    Corrupt(String),
}

/// Selection of backends
///
/// All set criteria must match; an empty filter matches every backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendFilter {
    pub id: Option<Uuid>,
    pub agent_ref: Option<String>,
    pub host: Option<String>,
}

impl BackendFilter {
    /// Match every backend
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_agent_ref(agent_ref: impl Into<String>) -> Self {
        Self {
            agent_ref: Some(agent_ref.into()),
            ..Self::default()
        }
    }

    pub fn by_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Whether `state` satisfies the filter
    pub fn matches(&self, state: &BackendState) -> bool {
        self.id.map_or(true, |id| state.id == id)
            && self
                .agent_ref
                .as_ref()
                .map_or(true, |agent_ref| state.agent_ref.as_ref() == Some(agent_ref))
            && self.host.as_ref().map_or(true, |host| &state.host == host)
    }
}

/// Source of transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

/// An open transaction
///
/// Dropping the transaction without committing rolls it back.
#[async_trait]
pub trait StoreTx: Send {
    /// First backend matching `filter`, if any
    async fn find_backend(
        &mut self,
        filter: &BackendFilter,
    ) -> Result<Option<BackendState>, StoreError>;

    /// All backends matching `filter`, oldest first
    async fn list_backends(&mut self, filter: &BackendFilter)
        -> Result<Vec<BackendState>, StoreError>;

    /// Persist a new backend
    ///
    /// Fails with [`StoreError::Duplicate`] when the id or agent reference
    /// is taken.
    async fn insert_backend(&mut self, state: &BackendState) -> Result<Uuid, StoreError>;

    /// Overwrite an existing backend
    ///
    /// The agent heartbeat is left as stored; [`StoreTx::touch_heartbeat`]
    /// is its only writer.
    async fn update_backend(&mut self, state: &BackendState) -> Result<(), StoreError>;

    /// Remove a backend
    async fn delete_backend(&mut self, id: Uuid) -> Result<(), StoreError>;

    /// Set the agent heartbeat timestamp of a backend
    async fn touch_heartbeat(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Make all changes of this transaction visible
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard all changes of this transaction
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Finish a transaction according to the outcome of the work done in it
///
/// Commits on `Ok`, rolls back on `Err`. A failed rollback is logged and
/// the original error returned.
pub async fn finish<T, E>(tx: Box<dyn StoreTx>, outcome: Result<T, E>) -> Result<T, E>
where
    E: From<StoreError>,
{
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}
