//! Poller scenarios driven by scripted collaborators

use std::sync::Arc;
use std::time::Duration;

use berth_inventory::{InMemoryInventory, ScriptedOrchestration};
use berth_types::{NodeDescriptor, NodeId, ProvisionSnapshot, ProvisionState, StackEvent, StackSnapshot};
use berth_wait::{
    CollectingEventSink, ProvisionWaitConfig, ProvisionWaiter, RecordingDelay, StackWaitConfig,
    StackWatcher, WaitError, WaitOutcome,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn event(id: &str, second: u32) -> StackEvent {
    StackEvent {
        id: id.to_string(),
        resource_name: "Controller".to_string(),
        status: "CREATE_IN_PROGRESS".to_string(),
        reason: "state changed".to_string(),
        time: Utc.with_ymd_and_hms(2015, 10, 14, 2, 25, second).unwrap(),
    }
}

fn stack(status: &str) -> Option<StackSnapshot> {
    Some(StackSnapshot::new("stack-id", "overcloud", status))
}

fn watch(orchestration: &Arc<ScriptedOrchestration>) -> (bool, Arc<RecordingDelay>, Arc<CollectingEventSink>) {
    let delay = Arc::new(RecordingDelay::new());
    let sink = Arc::new(CollectingEventSink::new());
    let ready = StackWatcher::new(orchestration.clone(), delay.clone(), StackWaitConfig::default())
        .with_sink(sink.clone())
        .wait_for_stack_ready("overcloud")
        .unwrap();
    (ready, delay, sink)
}

#[test]
fn test_stack_ready_after_two_event_cycles() {
    let orchestration = Arc::new(ScriptedOrchestration::new(
        [
            stack("CREATE_IN_PROGRESS"),
            stack("CREATE_IN_PROGRESS"),
            stack("CREATE_COMPLETE"),
        ],
        [
            vec![event("e1", 1), event("e2", 2)],
            vec![event("e3", 3), event("e4", 4)],
        ],
    ));

    let (ready, delay, sink) = watch(&orchestration);

    assert!(ready);
    assert_eq!(delay.count(), 2);
    assert_eq!(delay.total(), Duration::from_secs(10));
    assert_eq!(sink.ids(), vec!["e1", "e2", "e3", "e4"]);
    assert_eq!(
        orchestration.markers(),
        vec![None, Some("e2".to_string())]
    );
}

#[test]
fn test_events_emitted_in_time_order_once() {
    let orchestration = Arc::new(ScriptedOrchestration::new(
        [
            stack("UPDATE_IN_PROGRESS"),
            stack("UPDATE_IN_PROGRESS"),
            stack("UPDATE_FAILED"),
        ],
        [
            // Out of order, with a tie on time
            vec![event("b", 2), event("c", 1), event("a", 2)],
            // Re-delivered tail plus one new event
            vec![event("b", 2), event("d", 3)],
        ],
    ));

    let (ready, _, sink) = watch(&orchestration);

    assert!(!ready);
    assert_eq!(sink.ids(), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_stack_deleted_while_waiting() {
    let orchestration = Arc::new(ScriptedOrchestration::new(
        [stack("DELETE_IN_PROGRESS"), None],
        [vec![event("e1", 1)]],
    ));

    let (ready, delay, sink) = watch(&orchestration);

    assert!(!ready);
    assert_eq!(delay.count(), 1);
    assert_eq!(sink.ids(), vec!["e1"]);
}

fn provision_waiter(inventory: &Arc<InMemoryInventory>, max_loops: u32) -> (ProvisionWaiter, Arc<RecordingDelay>) {
    let delay = Arc::new(RecordingDelay::new());
    let config = ProvisionWaitConfig {
        max_loops,
        ..Default::default()
    };
    (
        ProvisionWaiter::new(inventory.clone(), delay.clone(), config),
        delay,
    )
}

#[test]
fn test_provision_reaches_goal_after_transient_states() {
    let id = NodeId::new("n1");
    let inventory = Arc::new(InMemoryInventory::with_nodes([NodeDescriptor::new(
        "n1",
        ProvisionState::Cleaning,
    )]));
    inventory.script_snapshots(
        &id,
        [
            Some(ProvisionSnapshot::new(ProvisionState::Cleaning)),
            Some(ProvisionSnapshot::new(ProvisionState::CleanWait)),
            Some(ProvisionSnapshot::new(ProvisionState::Available)),
        ],
    );
    let (waiter, delay) = provision_waiter(&inventory, 10);

    let outcome = waiter.wait_for_state(&id, &ProvisionState::Available).unwrap();

    assert_eq!(outcome, WaitOutcome::Reached { polls: 3 });
    assert_eq!(delay.sleeps(), vec![Duration::from_secs(1); 2]);
}

#[test]
fn test_provision_failure_carries_context() {
    let id = NodeId::new("n1");
    let inventory = Arc::new(InMemoryInventory::with_nodes([NodeDescriptor::new(
        "n1",
        ProvisionState::Manageable,
    )
    .with_last_error("power on failed")]));
    let (waiter, delay) = provision_waiter(&inventory, 10);

    let err = waiter
        .wait_for_state(&id, &ProvisionState::Available)
        .unwrap_err();

    match &err {
        WaitError::StateTransitionFailed {
            node_id,
            goal,
            state,
            error,
        } => {
            assert_eq!(node_id, &id);
            assert_eq!(goal, &ProvisionState::Available);
            assert_eq!(state, &ProvisionState::Manageable);
            assert_eq!(error, "power on failed");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retryable());
    assert_eq!(delay.count(), 0);
}

#[test]
fn test_error_on_goal_state_is_success() {
    let inventory = Arc::new(InMemoryInventory::with_nodes([NodeDescriptor::new(
        "n1",
        ProvisionState::Available,
    )
    .with_last_error("stale error")]));
    let (waiter, _) = provision_waiter(&inventory, 3);

    let outcome = waiter
        .wait_for_state(&NodeId::new("n1"), &ProvisionState::Available)
        .unwrap();
    assert!(outcome.is_reached());
}

proptest! {
    #[test]
    fn provision_poller_fetches_at_most_max_loops(max_loops in 0u32..20) {
        let id = NodeId::new("stuck");
        let inventory = Arc::new(InMemoryInventory::with_nodes([NodeDescriptor::new(
            "stuck",
            ProvisionState::Deploying,
        )]));
        let (waiter, delay) = provision_waiter(&inventory, max_loops);

        let result = waiter.wait_for_state(&id, &ProvisionState::Active);

        let timed_out = matches!(result, Err(WaitError::Timeout { loops, .. }) if loops == max_loops);
        prop_assert!(timed_out);
        prop_assert_eq!(inventory.snapshot_fetches(), max_loops as usize);
        prop_assert_eq!(delay.count(), max_loops.saturating_sub(1) as usize);
    }
}
