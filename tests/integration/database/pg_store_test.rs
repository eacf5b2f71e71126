//! PostgreSQL store tests
//!
//! Run against `DATABASE_URL`; skipped without it.

use chrono::{Duration as ChronoDuration, Utc};
use serial_test::serial;

use bbbgate::backend::agents::agent_heartbeat;
use bbbgate::backend::store::{
    AdminState, BackendFilter, BackendSettings, BackendState, NodeState, Store, StoreError,
};

use crate::common::{cleanup_backends, test_pg_store};

fn backend(host: &str, agent_ref: Option<&str>) -> BackendState {
    let mut state = BackendState::new(host, "secret", AdminState::Enabled, Utc::now());
    state.agent_ref = agent_ref.map(str::to_string);
    state.tags = vec!["sip".to_string(), "gpu".to_string()];
    state.settings = BackendSettings {
        max_meetings: Some(10),
        ..BackendSettings::default()
    };
    state
}

#[tokio::test]
#[serial]
async fn test_insert_and_find() {
    let Some(store) = test_pg_store().await else {
        return;
    };
    let state = backend("https://pg-find.example.com", Some("pg-find"));

    let mut tx = assert_ok!(store.begin().await);
    assert_ok!(tx.insert_backend(&state).await);
    assert_ok!(tx.commit().await);

    let mut tx = assert_ok!(store.begin().await);
    let found = assert_ok!(tx.find_backend(&BackendFilter::by_agent_ref("pg-find")).await);
    assert_ok!(tx.commit().await);

    let found = found.expect("backend should be stored");
    assert_eq!(found.id, state.id);
    assert_eq!(found.tags, state.tags);
    assert_eq!(found.settings.max_meetings, Some(10));
    assert_eq!(found.node_state, NodeState::Stopped);

    cleanup_backends(&store, &[state.id]).await;
}

#[tokio::test]
#[serial]
async fn test_duplicate_agent_ref() {
    let Some(store) = test_pg_store().await else {
        return;
    };
    let first = backend("https://pg-dup1.example.com", Some("pg-dup"));
    let second = backend("https://pg-dup2.example.com", Some("pg-dup"));

    let mut tx = assert_ok!(store.begin().await);
    assert_ok!(tx.insert_backend(&first).await);
    assert_ok!(tx.commit().await);

    let mut tx = assert_ok!(store.begin().await);
    assert_err!(
        tx.insert_backend(&second).await,
        StoreError::Duplicate { field: "agent_ref", .. }
    );
    assert_ok!(tx.rollback().await);

    cleanup_backends(&store, &[first.id, second.id]).await;
}

#[tokio::test]
#[serial]
async fn test_dropped_transaction_rolls_back() {
    let Some(store) = test_pg_store().await else {
        return;
    };
    let state = backend("https://pg-drop.example.com", None);

    {
        let mut tx = assert_ok!(store.begin().await);
        assert_ok!(tx.insert_backend(&state).await);
    }

    let mut tx = assert_ok!(store.begin().await);
    let found = assert_ok!(tx.find_backend(&BackendFilter::by_id(state.id)).await);
    assert_ok!(tx.commit().await);
    assert!(found.is_none());
}

#[tokio::test]
#[serial]
async fn test_touch_heartbeat() {
    let Some(store) = test_pg_store().await else {
        return;
    };
    let state = backend("https://pg-touch.example.com", Some("pg-touch"));
    let at = Utc::now() - ChronoDuration::seconds(3);

    let mut tx = assert_ok!(store.begin().await);
    assert_ok!(tx.insert_backend(&state).await);
    assert_ok!(tx.touch_heartbeat(state.id, at).await);
    assert_ok!(tx.commit().await);

    let mut tx = assert_ok!(store.begin().await);
    let found = assert_ok!(tx.find_backend(&BackendFilter::by_id(state.id)).await).unwrap();
    assert_ok!(tx.commit().await);

    // Postgres keeps microseconds
    let stored = found.agent_heartbeat.unwrap();
    assert!((stored - at).num_milliseconds().abs() < 1);

    cleanup_backends(&store, &[state.id]).await;
}

#[tokio::test]
#[serial]
async fn test_update_does_not_overwrite_concurrent_heartbeat() {
    let Some(store) = test_pg_store().await else {
        return;
    };
    let mut state = backend("https://pg-race.example.com", Some("pg-race"));
    state.agent_heartbeat = Some(Utc::now() - ChronoDuration::seconds(60));

    let mut tx = assert_ok!(store.begin().await);
    assert_ok!(tx.insert_backend(&state).await);
    assert_ok!(tx.commit().await);

    // Reconcile reads the record, then the agent reports before it writes back
    let mut reconcile = assert_ok!(store.begin().await);
    let mut read = assert_ok!(reconcile.find_backend(&BackendFilter::by_id(state.id)).await)
        .expect("backend should be stored");

    let reported = Utc::now();
    assert_ok!(agent_heartbeat(&store, "pg-race", reported).await);

    read.record_reconcile_success(Utc::now());
    assert_ok!(reconcile.update_backend(&read).await);
    assert_ok!(reconcile.commit().await);

    let mut tx = assert_ok!(store.begin().await);
    let found = assert_ok!(tx.find_backend(&BackendFilter::by_id(state.id)).await).unwrap();
    assert_ok!(tx.commit().await);

    assert_eq!(found.node_state, NodeState::Ready);
    let stored = found.agent_heartbeat.unwrap();
    assert!((stored - reported).num_milliseconds().abs() < 1);

    cleanup_backends(&store, &[state.id]).await;
}
