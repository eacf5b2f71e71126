//! Property-based tests for backend liveness and eligibility

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use proptest::prelude::*;

use bbbgate::backend::store::{AdminState, BackendState, NodeState};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn admin_state() -> impl Strategy<Value = AdminState> {
    prop_oneof![Just(AdminState::Enabled), Just(AdminState::Disabled)]
}

fn node_state() -> impl Strategy<Value = NodeState> {
    prop_oneof![Just(NodeState::Ready), Just(NodeState::Stopped), Just(NodeState::Error)]
}

proptest! {
    #[test]
    fn test_alive_iff_heartbeat_younger_than_threshold(
        age_ms in 0i64..60_000,
        threshold_ms in 1u64..30_000,
    ) {
        let now = at(100);
        let mut state = BackendState::new("https://bbb1.example.com", "s", AdminState::Enabled, at(0));
        state.agent_heartbeat = Some(now - ChronoDuration::milliseconds(age_ms));

        let alive = state.is_alive(now, Duration::from_millis(threshold_ms));
        prop_assert_eq!(alive, (age_ms as u64) < threshold_ms);
    }

    #[test]
    fn test_future_heartbeat_is_alive(ahead_ms in 1i64..60_000) {
        let now = at(100);
        let mut state = BackendState::new("https://bbb1.example.com", "s", AdminState::Enabled, at(0));
        state.agent_heartbeat = Some(now + ChronoDuration::milliseconds(ahead_ms));
        prop_assert!(state.is_alive(now, Duration::from_secs(1)));
    }

    #[test]
    fn test_eligibility_requires_all_conditions(
        admin in admin_state(),
        node in node_state(),
        heartbeat_age in prop::option::of(0i64..30),
    ) {
        let now = at(100);
        let threshold = Duration::from_secs(10);
        let mut state = BackendState::new("https://bbb1.example.com", "s", admin, at(0));
        state.node_state = node;
        state.agent_heartbeat = heartbeat_age.map(|age| now - ChronoDuration::seconds(age));

        let expected = admin == AdminState::Enabled
            && node == NodeState::Ready
            && heartbeat_age.is_some_and(|age| age < 10);
        prop_assert_eq!(state.is_eligible(now, threshold), expected);
    }

    #[test]
    fn test_reconcile_never_readies_disabled_backend(
        node in node_state(),
        failures in prop::collection::vec(any::<bool>(), 0..10),
    ) {
        let mut state = BackendState::new("https://bbb1.example.com", "s", AdminState::Disabled, at(0));
        state.node_state = node;

        for (i, failed) in failures.iter().enumerate() {
            let now = at(i as i64 + 1);
            if *failed {
                state.record_reconcile_failure("unreachable", now);
            } else {
                state.record_reconcile_success(now);
            }
        }

        if node == NodeState::Stopped {
            prop_assert_eq!(state.node_state, NodeState::Stopped);
        }
        prop_assert!(!state.is_eligible(at(50), Duration::from_secs(10)));
    }
}
