//! Database test fixtures
//!
//! PostgreSQL tests only run when `DATABASE_URL` is set; without it they
//! return early.

use bbbgate::backend::store::PgStore;

/// Connect and migrate, or `None` without a configured database
pub async fn test_pg_store() -> Option<PgStore> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        }
    };

    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    store.migrate().await.expect("Failed to run migrations");
    Some(store)
}

/// Remove the given backends
pub async fn cleanup_backends(store: &PgStore, ids: &[uuid::Uuid]) {
    sqlx::query("DELETE FROM backends WHERE id = ANY($1)")
        .bind(ids)
        .execute(store.pool())
        .await
        .expect("Failed to clean up backends");
}
