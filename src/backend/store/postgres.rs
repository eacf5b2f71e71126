//! PostgreSQL store
//!
//! Runtime checked queries against the `backends` table created by the
//! migrations in `migrations/`. Filters are assembled with `QueryBuilder`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use uuid::Uuid;

use crate::backend::store::{
    BackendFilter, BackendSettings, BackendState, Store, StoreError, StoreTx,
};

const COLUMNS: &str = "id, host, secret, admin_state, node_state, last_error, tags, agent_ref, \
                       agent_heartbeat, settings, created_at, updated_at, synced_at";

/// PostgreSQL backed [`Store`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

fn select_backends(filter: &BackendFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM backends WHERE TRUE", COLUMNS));
    if let Some(id) = filter.id {
        query.push(" AND id = ").push_bind(id);
    }
    if let Some(agent_ref) = &filter.agent_ref {
        query.push(" AND agent_ref = ").push_bind(agent_ref.clone());
    }
    if let Some(host) = &filter.host {
        query.push(" AND host = ").push_bind(host.clone());
    }
    query.push(" ORDER BY created_at, id");
    query
}

fn backend_from_row(row: &PgRow) -> Result<BackendState, StoreError> {
    let admin_state: String = row.try_get("admin_state")?;
    let node_state: String = row.try_get("node_state")?;
    let settings: Json<BackendSettings> = row.try_get("settings")?;

    Ok(BackendState {
        id: row.try_get("id")?,
        host: row.try_get("host")?,
        secret: row.try_get("secret")?,
        admin_state: admin_state.parse().map_err(StoreError::Corrupt)?,
        node_state: node_state.parse().map_err(StoreError::Corrupt)?,
        last_error: row.try_get("last_error")?,
        tags: row.try_get("tags")?,
        agent_ref: row.try_get("agent_ref")?,
        agent_heartbeat: row.try_get("agent_heartbeat")?,
        settings: settings.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        synced_at: row.try_get("synced_at")?,
    })
}

/// Translate unique violations into [`StoreError::Duplicate`]
fn map_write_error(err: sqlx::Error, state: &BackendState) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("backends_agent_ref_key") => StoreError::Duplicate {
                    field: "agent_ref",
                    value: state.agent_ref.clone().unwrap_or_default(),
                },
                _ => StoreError::Duplicate {
                    field: "id",
                    value: state.id.to_string(),
                },
            };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_backend(
        &mut self,
        filter: &BackendFilter,
    ) -> Result<Option<BackendState>, StoreError> {
        let mut query = select_backends(filter);
        query.push(" LIMIT 1");
        let row = query.build().fetch_optional(&mut *self.tx).await?;
        row.as_ref().map(backend_from_row).transpose()
    }

    async fn list_backends(
        &mut self,
        filter: &BackendFilter,
    ) -> Result<Vec<BackendState>, StoreError> {
        let rows = select_backends(filter).build().fetch_all(&mut *self.tx).await?;
        rows.iter().map(backend_from_row).collect()
    }

    async fn insert_backend(&mut self, state: &BackendState) -> Result<Uuid, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO backends (id, host, secret, admin_state, node_state, last_error, tags,
                                  agent_ref, agent_heartbeat, settings, created_at, updated_at, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(state.id)
        .bind(&state.host)
        .bind(&state.secret)
        .bind(state.admin_state.as_str())
        .bind(state.node_state.as_str())
        .bind(&state.last_error)
        .bind(&state.tags)
        .bind(&state.agent_ref)
        .bind(state.agent_heartbeat)
        .bind(Json(&state.settings))
        .bind(state.created_at)
        .bind(state.updated_at)
        .bind(state.synced_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, state))?;

        Ok(state.id)
    }

    async fn update_backend(&mut self, state: &BackendState) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE backends
            SET host = $2, secret = $3, admin_state = $4, node_state = $5, last_error = $6,
                tags = $7, agent_ref = $8, settings = $9,
                updated_at = $10, synced_at = $11
            WHERE id = $1
            "#,
        )
        .bind(state.id)
        .bind(&state.host)
        .bind(&state.secret)
        .bind(state.admin_state.as_str())
        .bind(state.node_state.as_str())
        .bind(&state.last_error)
        .bind(&state.tags)
        .bind(&state.agent_ref)
        .bind(Json(&state.settings))
        .bind(state.updated_at)
        .bind(state.synced_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, state))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(state.id));
        }
        Ok(())
    }

    async fn delete_backend(&mut self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM backends WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn touch_heartbeat(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE backends SET agent_heartbeat = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
