//! In-memory store
//!
//! A map of backends behind a `tokio::sync::Mutex`. A transaction holds the
//! lock and works on a copy of the map; the copy replaces the shared map
//! only on commit. Transactions are therefore serialized, which is fine for
//! tests and single instance deployments.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::backend::store::{BackendFilter, BackendState, Store, StoreError, StoreTx};

type Backends = BTreeMap<Uuid, BackendState>;

/// In-memory [`Store`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    backends: Arc<Mutex<Backends>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed backends, oldest first
    pub async fn snapshot(&self) -> Vec<BackendState> {
        sorted(self.backends.lock().await.values().cloned().collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = self.backends.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Backends>,
    working: Backends,
}

impl MemoryTx {
    fn check_unique(&self, state: &BackendState) -> Result<(), StoreError> {
        if let Some(agent_ref) = &state.agent_ref {
            let taken = self
                .working
                .values()
                .any(|other| other.id != state.id && other.agent_ref.as_ref() == Some(agent_ref));
            if taken {
                return Err(StoreError::Duplicate {
                    field: "agent_ref",
                    value: agent_ref.clone(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_backend(
        &mut self,
        filter: &BackendFilter,
    ) -> Result<Option<BackendState>, StoreError> {
        Ok(self.list_backends(filter).await?.into_iter().next())
    }

    async fn list_backends(
        &mut self,
        filter: &BackendFilter,
    ) -> Result<Vec<BackendState>, StoreError> {
        Ok(sorted(
            self.working
                .values()
                .filter(|state| filter.matches(state))
                .cloned()
                .collect(),
        ))
    }

    async fn insert_backend(&mut self, state: &BackendState) -> Result<Uuid, StoreError> {
        if self.working.contains_key(&state.id) {
            return Err(StoreError::Duplicate {
                field: "id",
                value: state.id.to_string(),
            });
        }
        self.check_unique(state)?;
        self.working.insert(state.id, state.clone());
        Ok(state.id)
    }

    async fn update_backend(&mut self, state: &BackendState) -> Result<(), StoreError> {
        let heartbeat = match self.working.get(&state.id) {
            Some(stored) => stored.agent_heartbeat,
            None => return Err(StoreError::NotFound(state.id)),
        };
        self.check_unique(state)?;
        let mut updated = state.clone();
        updated.agent_heartbeat = heartbeat;
        self.working.insert(state.id, updated);
        Ok(())
    }

    async fn delete_backend(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.working
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn touch_heartbeat(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let state = self.working.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        state.agent_heartbeat = Some(at);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

fn sorted(mut backends: Vec<BackendState>) -> Vec<BackendState> {
    backends.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    backends
}
