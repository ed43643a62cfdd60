//! Bulk provision-state transitions

use berth_types::{NodeDescriptor, NodeId, ProvisionState};
use tracing::{error, info, instrument};

use crate::error::{Result, WaitError};
use crate::provision::{ProvisionWaiter, WaitOutcome};

/// Result of moving one node
#[derive(Debug)]
pub struct TransitionOutcome {
    pub node_id: NodeId,
    pub result: std::result::Result<WaitOutcome, WaitError>,
}

impl TransitionOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Request `transition` on every node not in `skipped` and wait for `goal`.
///
/// A node that times out or fails its transition is logged and recorded; the
/// remaining nodes are still processed. Failing to request the transition at
/// all aborts the batch. Outcomes are returned in input order.
#[instrument(skip(waiter, nodes, skipped), fields(nodes = nodes.len()))]
pub fn set_nodes_state(
    waiter: &ProvisionWaiter,
    nodes: &[NodeDescriptor],
    transition: &str,
    goal: &ProvisionState,
    skipped: &[ProvisionState],
) -> Result<Vec<TransitionOutcome>> {
    let mut outcomes = Vec::new();

    for node in nodes {
        if skipped.contains(&node.provision_state) {
            continue;
        }

        info!(
            node_id = %node.id,
            state = %node.provision_state,
            transition,
            "Setting provision state"
        );
        waiter.inventory().set_provision_state(&node.id, transition)?;

        let result = waiter.wait_for_state(&node.id, goal);
        if let Err(err) = &result {
            error!(node_id = %node.id, error = %err, "FAIL: state not set for node");
        }
        outcomes.push(TransitionOutcome {
            node_id: node.id.clone(),
            result,
        });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvisionWaitConfig;
    use crate::delay::RecordingDelay;
    use berth_inventory::InMemoryInventory;
    use berth_types::ProvisionSnapshot;
    use std::sync::Arc;

    fn setup(nodes: Vec<NodeDescriptor>) -> (Arc<InMemoryInventory>, ProvisionWaiter) {
        let inventory = Arc::new(InMemoryInventory::with_nodes(nodes));
        let config = ProvisionWaitConfig {
            max_loops: 3,
            ..Default::default()
        };
        let waiter = ProvisionWaiter::new(inventory.clone(), Arc::new(RecordingDelay::new()), config);
        (inventory, waiter)
    }

    #[test]
    fn test_provide_skips_available() {
        let nodes = vec![
            NodeDescriptor::new("a", ProvisionState::Manageable),
            NodeDescriptor::new("b", ProvisionState::Available),
            NodeDescriptor::new("c", ProvisionState::Manageable),
        ];
        let (inventory, waiter) = setup(nodes.clone());

        let outcomes = set_nodes_state(
            &waiter,
            &nodes,
            "provide",
            &ProvisionState::Available,
            &[ProvisionState::Available],
        )
        .unwrap();

        let ids: Vec<_> = outcomes.iter().map(|o| o.node_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(outcomes.iter().all(TransitionOutcome::succeeded));
        assert_eq!(inventory.transitions().len(), 2);
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let nodes = vec![
            NodeDescriptor::new("a", ProvisionState::Manageable),
            NodeDescriptor::new("b", ProvisionState::Manageable),
        ];
        let (inventory, waiter) = setup(nodes.clone());
        inventory.script_snapshots(
            &NodeId::new("a"),
            [Some(ProvisionSnapshot::with_error(
                ProvisionState::CleanFailed,
                "cleaning failed",
            ))],
        );

        let outcomes = set_nodes_state(
            &waiter,
            &nodes,
            "provide",
            &ProvisionState::Available,
            &[],
        )
        .unwrap();

        assert!(matches!(
            outcomes[0].result,
            Err(WaitError::StateTransitionFailed { .. })
        ));
        assert!(outcomes[1].succeeded());
    }

    #[test]
    fn test_rejected_transition_aborts() {
        let nodes = vec![NodeDescriptor::new("a", ProvisionState::Manageable)];
        let (_, waiter) = setup(nodes.clone());

        let result = set_nodes_state(&waiter, &nodes, "explode", &ProvisionState::Available, &[]);
        assert!(matches!(result, Err(WaitError::Inventory(_))));
    }
}
