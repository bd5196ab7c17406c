//! Contract Test: Change Detection & Idempotency
//!
//! Verifies when a cycle updates the record and when it does not.
//!
//! Constraints verified:
//! - First run (no stored address) always updates once and persists once
//! - Equal resolved and stored addresses cause no update and no write
//! - A changed address updates exactly once and replaces the stored value
//! - Comparison is exact: no whitespace, case or IPv6 normalization
//! - Stored state survives a restart when backed by a file

mod common;

use cfddns_core::state::FileStateStore;
use cfddns_core::{CyclePhase, SyncController, SyncEvent, SyncOutcome};
use common::*;

#[tokio::test]
async fn first_run_updates_and_persists() {
    // First run: nothing stored yet, so the resolved address is always pushed
    let resolver = ScriptedResolver::returning("203.0.113.5");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::empty();

    let outcome = controller(&resolver, &updater, &store)
        .run_cycle()
        .await
        .expect("cycle succeeds");

    assert_eq!(
        outcome,
        SyncOutcome::Updated {
            previous: None,
            current: "203.0.113.5".into(),
        }
    );
    assert_eq!(updater.applied_addresses(), vec!["203.0.113.5"]);
    assert_eq!(updater.applied_records(), vec![test_record()]);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.stored().await.as_deref(), Some("203.0.113.5"));
}

#[tokio::test]
async fn unchanged_address_does_not_update() {
    // Resolved address matches the stored one: provider and store untouched
    let resolver = ScriptedResolver::returning("203.0.113.5");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::with_address("203.0.113.5");

    let outcome = controller(&resolver, &updater, &store)
        .run_cycle()
        .await
        .expect("cycle succeeds");

    assert_eq!(
        outcome,
        SyncOutcome::Unchanged {
            address: "203.0.113.5".into(),
        }
    );
    assert_eq!(updater.call_count(), 0, "no update call for an unchanged address");
    assert_eq!(store.write_count(), 0, "no store write for an unchanged address");
    assert_eq!(store.stored().await.as_deref(), Some("203.0.113.5"));
}

#[tokio::test]
async fn changed_address_updates_and_replaces_state() {
    // Resolved address differs: one update, then the new address is stored
    let resolver = ScriptedResolver::returning("198.51.100.9");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::with_address("203.0.113.5");

    let outcome = controller(&resolver, &updater, &store)
        .run_cycle()
        .await
        .expect("cycle succeeds");

    assert_eq!(
        outcome,
        SyncOutcome::Updated {
            previous: Some("203.0.113.5".into()),
            current: "198.51.100.9".into(),
        }
    );
    assert_eq!(updater.applied_addresses(), vec!["198.51.100.9"]);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.stored().await.as_deref(), Some("198.51.100.9"));
}

#[tokio::test]
async fn repeated_cycles_with_same_address_update_once() {
    let resolver = ScriptedResolver::default();
    for _ in 0..3 {
        resolver.push_ok("203.0.113.5");
    }
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::empty();
    let controller = controller(&resolver, &updater, &store);

    for _ in 0..3 {
        controller.run_cycle().await.expect("cycle succeeds");
    }

    assert_eq!(resolver.call_count(), 3);
    assert_eq!(updater.call_count(), 1);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn change_propagates_on_second_cycle_only() {
    let pairs = [
        ("203.0.113.5", "198.51.100.9"),
        ("192.0.2.1", "192.0.2.10"),
        ("2001:db8::1", "2001:db8::2"),
        ("198.51.100.9", "2001:db8::1"),
    ];

    for (old, new) in pairs {
        let resolver = ScriptedResolver::default();
        resolver.push_ok(old);
        resolver.push_ok(new);
        let updater = RecordingUpdater::new();
        let store = CountingStateStore::with_address(old);
        let controller = controller(&resolver, &updater, &store);

        let first = controller.run_cycle().await.expect("first cycle succeeds");
        assert!(matches!(first, SyncOutcome::Unchanged { .. }), "{old}: first cycle must not update");
        assert_eq!(updater.call_count(), 0);
        assert_eq!(store.write_count(), 0);

        let second = controller.run_cycle().await.expect("second cycle succeeds");
        assert!(matches!(second, SyncOutcome::Updated { .. }), "{old} -> {new}: second cycle must update");
        assert_eq!(updater.applied_addresses(), vec![new]);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.stored().await.as_deref(), Some(new));
    }
}

#[tokio::test]
async fn comparison_is_exact_string_match() {
    let cases = [
        ("203.0.113.5", "203.0.113.5 "),
        ("2001:db8::1", "2001:0db8::1"),
        ("2001:db8::a", "2001:DB8::A"),
        ("10.0.0.1", "010.000.000.001"),
    ];

    for (stored, resolved) in cases {
        let resolver = ScriptedResolver::returning(resolved);
        let updater = RecordingUpdater::new();
        let store = CountingStateStore::with_address(stored);

        let outcome = controller(&resolver, &updater, &store)
            .run_cycle()
            .await
            .expect("cycle succeeds");

        assert!(
            matches!(outcome, SyncOutcome::Updated { .. }),
            "{stored:?} vs {resolved:?} must count as a change"
        );
        assert_eq!(updater.applied_addresses(), vec![resolved]);
    }
}

#[tokio::test]
async fn file_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("current_ip.txt");

    // First "run": nothing stored yet
    {
        let updater = RecordingUpdater::new();
        let controller = SyncController::new(
            Box::new(ScriptedResolver::returning("203.0.113.5")),
            Box::new(updater.clone()),
            Box::new(FileStateStore::new(&path).await.unwrap()),
            test_record(),
        );

        controller.run_cycle().await.expect("cycle succeeds");
        assert_eq!(updater.call_count(), 1);
    }

    // Second "run": new store instance over the same file
    {
        let updater = RecordingUpdater::new();
        let controller = SyncController::new(
            Box::new(ScriptedResolver::returning("203.0.113.5")),
            Box::new(updater.clone()),
            Box::new(FileStateStore::new(&path).await.unwrap()),
            test_record(),
        );

        let outcome = controller.run_cycle().await.expect("cycle succeeds");
        assert!(matches!(outcome, SyncOutcome::Unchanged { .. }));
        assert_eq!(updater.call_count(), 0, "restart with same address must not update");
    }

    // Deleting the state file makes the next run update again
    std::fs::remove_file(&path).unwrap();
    {
        let updater = RecordingUpdater::new();
        let controller = SyncController::new(
            Box::new(ScriptedResolver::returning("203.0.113.5")),
            Box::new(updater.clone()),
            Box::new(FileStateStore::new(&path).await.unwrap()),
            test_record(),
        );

        controller.run_cycle().await.expect("cycle succeeds");
        assert_eq!(updater.call_count(), 1);
    }
}

#[tokio::test]
async fn phase_events_follow_update_path() {
    let resolver = ScriptedResolver::returning("203.0.113.5");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::empty();
    let mut controller = controller(&resolver, &updater, &store);
    let mut events = controller.subscribe(16);

    controller.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        drain_phases(&mut events),
        vec![
            CyclePhase::Resolving,
            CyclePhase::Comparing,
            CyclePhase::Updating,
            CyclePhase::Persisting,
            CyclePhase::Idle,
        ]
    );
}

#[tokio::test]
async fn phase_events_follow_no_change_path() {
    let resolver = ScriptedResolver::returning("203.0.113.5");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::with_address("203.0.113.5");
    let mut controller = controller(&resolver, &updater, &store);
    let mut events = controller.subscribe(16);

    controller.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        drain_phases(&mut events),
        vec![
            CyclePhase::Resolving,
            CyclePhase::Comparing,
            CyclePhase::NoChange,
            CyclePhase::Idle,
        ]
    );
}

#[tokio::test]
async fn full_event_channel_does_not_block_cycle() {
    let resolver = ScriptedResolver::returning("203.0.113.5");
    let updater = RecordingUpdater::new();
    let store = CountingStateStore::empty();
    let mut controller = controller(&resolver, &updater, &store);
    let mut events = controller.subscribe(1);

    controller.run_cycle().await.expect("cycle succeeds");

    // Only the first transition fits; the rest were dropped
    let first = events.try_recv().expect("one event buffered");
    assert_eq!(
        first,
        SyncEvent::PhaseChanged {
            from: CyclePhase::Idle,
            to: CyclePhase::Resolving,
        }
    );
    assert!(events.try_recv().is_err());
    assert_eq!(updater.call_count(), 1);
}

fn drain_phases(events: &mut tokio::sync::mpsc::Receiver<SyncEvent>) -> Vec<CyclePhase> {
    let mut phases = Vec::new();
    let mut from = CyclePhase::Idle;
    while let Ok(SyncEvent::PhaseChanged { from: f, to }) = events.try_recv() {
        assert_eq!(f, from, "transitions must be contiguous");
        phases.push(to);
        from = to;
    }
    phases
}
