//! Integration tests for the hybrid state container
//!
//! These tests verify that:
//! - Notifications only fire on effective changes
//! - Controlled keys are never persisted over the owner's value
//! - Uncontrolled keys persist and shadow values survive control hand-off
//! - Updates can be issued re-entrantly from the change hook
//! - A panicking hook leaves the committed state intact
//! - Concurrent functional updates are atomic read-modify-writes

use blinc_state::{ChangeSet, EffectiveState, HybridState, Overrides, Patch, Update};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type Calls = Arc<Mutex<Vec<ChangeSet<i32>>>>;

fn counting_state(initial: &[(&'static str, i32)]) -> (HybridState<i32>, Calls) {
    init_tracing();
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let calls_clone = calls.clone();
    let state = HybridState::builder()
        .with_initial(initial.iter().copied())
        .on_change(move |changes: &ChangeSet<i32>, _: &EffectiveState<i32>| {
            calls_clone.lock().unwrap().push(changes.clone());
        })
        .build();
    (state, calls)
}

/// Proposing the current effective value never notifies
#[test]
fn test_no_spurious_notification() {
    let (state, calls) = counting_state(&[("a", 1), ("b", 2)]);
    let controlled = Overrides::new().control("b", 20);

    state.update(Patch::new().set("a", 1), &Overrides::new());
    state.update(Patch::new().set("a", 1).set("b", 20), &controlled);
    state.update(
        Update::func(|prev: &EffectiveState<i32>| {
            prev.iter().map(|(k, v)| (k.clone(), *v)).collect()
        }),
        &controlled,
    );

    assert!(calls.lock().unwrap().is_empty());
}

/// A key controlled throughout always reads as the override
#[test]
fn test_controlled_keys_never_persist() {
    let (state, _calls) = counting_state(&[("k", 0)]);
    let controlled = Overrides::new().control("k", 42);

    for value in [1, 2, 3, 42, 7] {
        state.set("k", value, &controlled);
        assert_eq!(state.read(&controlled).get("k"), Some(&42));
    }
}

/// An uncontrolled key reads back the last written value
#[test]
fn test_uncontrolled_persistence() {
    let (state, calls) = counting_state(&[("k", 0)]);
    let none = Overrides::new();

    state.set("k", 5, &none);
    assert_eq!(state.read(&none).get("k"), Some(&5));
    state.set("other", 9, &none);
    assert_eq!(state.read(&none).get("k"), Some(&5));
    state.set("k", 6, &none);
    assert_eq!(state.read(&none).get("k"), Some(&6));

    assert_eq!(calls.lock().unwrap().len(), 3);
}

/// Writes made while controlled are revealed once control is released
#[test]
fn test_control_handoff_preserves_shadow() {
    let (state, calls) = counting_state(&[("k", 0)]);
    let mut overrides = Overrides::new().control("k", 100);

    let changes = state.set("k", 200, &overrides);
    assert_eq!(changes.get("k"), Some(&200));
    assert_eq!(state.get("k", &overrides), Some(100));

    overrides.release("k");
    assert_eq!(state.get("k", &overrides), Some(200));

    // Taking control again hides the shadow without touching it
    overrides.insert("k", 1);
    assert_eq!(state.get("k", &overrides), Some(1));
    assert_eq!(state.stored("k"), Some(200));

    assert_eq!(calls.lock().unwrap().len(), 1);
}

/// Functional updates see controlled values
#[test]
fn test_functional_update_sees_effective_state() {
    let (state, calls) = counting_state(&[("k", 1)]);
    let controlled = Overrides::new().control("k", 10);

    let changes = state.update(
        Update::func(|prev: &EffectiveState<i32>| {
            Patch::single("k", prev.get("k").copied().unwrap_or(0) + 1)
        }),
        &controlled,
    );

    assert_eq!(changes.get("k"), Some(&11));
    assert_eq!(state.stored("k"), Some(1));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

/// Mixed patch: only the uncontrolled part is written
#[test]
fn test_partition_mixed_patch() {
    let (state, calls) = counting_state(&[("a", 1), ("b", 2)]);
    let controlled = Overrides::new().control("b", 2);

    let changes = state.update(Patch::new().set("a", 10).set("b", 20), &controlled);

    assert_eq!(changes.len(), 2);
    assert_eq!(state.stored("a"), Some(10));
    assert_eq!(state.stored("b"), Some(2));
    assert_eq!(state.read(&controlled).get("b"), Some(&2));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

/// The change hook may issue a follow-up update on the same container
#[test]
fn test_reentrant_update_from_hook() {
    init_tracing();
    let slot: Arc<Mutex<Option<HybridState<i32>>>> = Arc::new(Mutex::new(None));
    let slot_clone = slot.clone();
    let notified = Arc::new(Mutex::new(Vec::new()));
    let notified_clone = notified.clone();

    let state = HybridState::builder()
        .initial("count", 0)
        .initial("mirror", 0)
        .on_change(move |changes: &ChangeSet<i32>, _: &EffectiveState<i32>| {
            let keys: Vec<String> = changes.keys().map(|k| k.to_string()).collect();
            notified_clone.lock().unwrap().push(keys);
            if let Some(count) = changes.get("count").copied() {
                let state = slot_clone.lock().unwrap().clone();
                if let Some(state) = state {
                    state.set("mirror", count * 2, &Overrides::new());
                }
            }
        })
        .build();
    *slot.lock().unwrap() = Some(state.clone());

    state.set("count", 3, &Overrides::new());

    assert_eq!(state.stored("mirror"), Some(6));
    assert_eq!(
        *notified.lock().unwrap(),
        vec![vec!["count".to_string()], vec!["mirror".to_string()]]
    );
}

/// Completion fires after the hook, and also for no-op updates
#[test]
fn test_completion_vs_notification() {
    init_tracing();
    let order = Arc::new(Mutex::new(Vec::new()));
    let order_hook = order.clone();
    let state = HybridState::builder()
        .initial("v", 0)
        .on_change(move |_: &ChangeSet<i32>, _: &EffectiveState<i32>| {
            order_hook.lock().unwrap().push("change")
        })
        .build();

    let order_done = order.clone();
    state.update_then(Patch::single("v", 1), &Overrides::new(), move |_| {
        order_done.lock().unwrap().push("complete")
    });
    let order_done = order.clone();
    state.update_then(Patch::single("v", 1), &Overrides::new(), move |_| {
        order_done.lock().unwrap().push("complete")
    });

    assert_eq!(*order.lock().unwrap(), vec!["change", "complete", "complete"]);
}

/// A panicking hook propagates, but the update is already committed
#[test]
fn test_panicking_hook_keeps_committed_state() {
    init_tracing();
    let state = HybridState::builder()
        .initial("v", 0)
        .on_change(|_: &ChangeSet<i32>, _: &EffectiveState<i32>| panic!("hook failed"))
        .build();

    let result = catch_unwind(AssertUnwindSafe(|| {
        state.set("v", 1, &Overrides::new());
    }));

    assert!(result.is_err());
    assert_eq!(state.get("v", &Overrides::new()), Some(1));

    // The container remains usable
    let changes = state.update(Patch::single("v", 1), &Overrides::new());
    assert!(changes.is_empty());
}

/// A failing updater propagates its error and writes nothing
#[test]
fn test_failing_updater_propagates() {
    let (state, calls) = counting_state(&[("v", 1)]);

    let result = state.try_update(
        |prev: &EffectiveState<i32>| match prev.get("v") {
            Some(v) if *v > 0 => Err(format!("refusing to change {v}")),
            _ => Ok(Patch::single("v", 0)),
        },
        &Overrides::new(),
    );

    assert_eq!(result.unwrap_err(), "refusing to change 1");
    assert_eq!(state.stored("v"), Some(1));
    assert!(calls.lock().unwrap().is_empty());
}

/// Structured values compare by equality, not identity
#[test]
fn test_structured_values() {
    #[derive(Clone, Debug, PartialEq)]
    enum Value {
        Text(String),
        Flag(bool),
    }

    let state = HybridState::new([
        ("text", Value::Text(String::new())),
        ("flag", Value::Flag(false)),
    ]);

    let changes = state.update(
        Patch::new()
            .set("text", Value::Text(String::new()))
            .set("flag", Value::Flag(true)),
        &Overrides::new(),
    );

    assert_eq!(changes.len(), 1);
    assert_eq!(changes.get("flag"), Some(&Value::Flag(true)));
}

/// `Option` values distinguish "controlled as empty" from "not controlled"
#[test]
fn test_controlled_none_is_still_controlled() {
    let state = HybridState::new([("query", Some("stored".to_string()))]);
    let controlled = Overrides::new().control("query", None);

    assert!(state.is_controlled("query", &controlled));
    assert_eq!(state.get("query", &controlled), Some(None));
    assert_eq!(
        state.get("query", &Overrides::new()),
        Some(Some("stored".to_string()))
    );
}

/// Functional updates from cloned handles on many threads never lose a write
#[test]
fn test_concurrent_functional_updates_are_atomic() {
    let (state, calls) = counting_state(&[("n", 0)]);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    state.update(
                        Update::func(|prev: &EffectiveState<i32>| {
                            Patch::single("n", prev.get("n").copied().unwrap_or_default() + 1)
                        }),
                        &Overrides::new(),
                    );
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(state.get("n", &Overrides::new()), Some(8000));
    assert_eq!(calls.lock().unwrap().len(), 8000);
}
