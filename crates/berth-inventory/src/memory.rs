//! In-memory implementations of collaborator traits
//!
//! These are suitable for development and testing. They record every
//! mutating call so tests can assert on exactly what would have been
//! persisted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use berth_types::{
    CapabilitySet, NodeDescriptor, NodeId, ProvisionSnapshot, ProvisionState, StackEvent,
    StackSnapshot,
};
use dashmap::DashMap;
use tracing::debug;

use crate::compute::{ComputeClient, HypervisorStats};
use crate::error::{InventoryError, Result};
use crate::node::{InventoryClient, NodeFilter};
use crate::orchestration::OrchestrationClient;

/// Replays queued responses; once drained, keeps returning the last one
#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<T>,
    last: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            queue: items.into_iter().collect(),
            last: None,
        }
    }

    fn next(&mut self) -> Option<T> {
        match self.queue.pop_front() {
            Some(item) => {
                self.last = Some(item.clone());
                Some(item)
            }
            None => self.last.clone(),
        }
    }
}

/// A recorded capability update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityUpdate {
    pub node_id: NodeId,
    pub capabilities: CapabilitySet,
}

/// In-memory node inventory
pub struct InMemoryInventory {
    nodes: DashMap<NodeId, NodeDescriptor>,
    updates: Mutex<Vec<CapabilityUpdate>>,
    transitions: Mutex<Vec<(NodeId, String)>>,
    snapshot_scripts: DashMap<NodeId, Script<Option<ProvisionSnapshot>>>,
    snapshot_fetches: AtomicUsize,
    rejected: DashMap<NodeId, String>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            updates: Mutex::new(Vec::new()),
            transitions: Mutex::new(Vec::new()),
            snapshot_scripts: DashMap::new(),
            snapshot_fetches: AtomicUsize::new(0),
            rejected: DashMap::new(),
        }
    }

    /// Create an inventory holding the given nodes
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeDescriptor>) -> Self {
        let inventory = Self::new();
        for node in nodes {
            inventory.insert(node);
        }
        inventory
    }

    /// Insert or replace a node
    pub fn insert(&self, node: NodeDescriptor) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn remove(&self, id: &NodeId) -> Option<NodeDescriptor> {
        self.nodes.remove(id).map(|(_, node)| node)
    }

    /// All nodes, sorted by id
    pub fn nodes(&self) -> Vec<NodeDescriptor> {
        let mut nodes: Vec<_> = self.nodes.iter().map(|n| n.value().clone()).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Queue provision snapshots returned by successive polls of `id`.
    ///
    /// `None` entries report the node as gone. After the queue drains the last
    /// entry keeps being returned.
    pub fn script_snapshots(
        &self,
        id: &NodeId,
        snapshots: impl IntoIterator<Item = Option<ProvisionSnapshot>>,
    ) {
        self.snapshot_scripts.insert(id.clone(), Script::new(snapshots));
    }

    /// Make capability updates for `id` fail with the given reason
    pub fn reject_updates(&self, id: &NodeId, reason: impl Into<String>) {
        self.rejected.insert(id.clone(), reason.into());
    }

    /// Capability updates performed so far, in call order
    pub fn updates(&self) -> Vec<CapabilityUpdate> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().map(|u| u.len()).unwrap_or_default()
    }

    /// Provision-state transitions requested so far, in call order
    pub fn transitions(&self) -> Vec<(NodeId, String)> {
        self.transitions.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Number of provision snapshots fetched so far
    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

/// State a transition verb leads to once it completes
fn transition_target(transition: &str) -> Option<ProvisionState> {
    match transition {
        "manage" | "inspect" | "clean" => Some(ProvisionState::Manageable),
        "provide" | "deleted" => Some(ProvisionState::Available),
        "active" | "deploy" | "rebuild" => Some(ProvisionState::Active),
        _ => None,
    }
}

impl InventoryClient for InMemoryInventory {
    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeDescriptor>> {
        Ok(self
            .nodes()
            .into_iter()
            .filter(|node| filter.matches(node))
            .collect())
    }

    fn get_node(&self, id: &NodeId) -> Result<Option<NodeDescriptor>> {
        Ok(self.nodes.get(id).map(|n| n.clone()))
    }

    fn update_node_capabilities(&self, id: &NodeId, capabilities: &CapabilitySet) -> Result<()> {
        if let Some(reason) = self.rejected.get(id) {
            return Err(InventoryError::Rejected {
                node_id: id.clone(),
                reason: reason.value().clone(),
            });
        }

        let mut node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| InventoryError::NodeNotFound(id.clone()))?;
        node.capabilities = capabilities.clone();

        self.updates
            .lock()
            .map_err(|_| InventoryError::Lock)?
            .push(CapabilityUpdate {
                node_id: id.clone(),
                capabilities: capabilities.clone(),
            });

        debug!(node_id = %id, capabilities = %capabilities, "Capabilities updated");
        Ok(())
    }

    fn set_provision_state(&self, id: &NodeId, transition: &str) -> Result<()> {
        let mut node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| InventoryError::NodeNotFound(id.clone()))?;

        let target = transition_target(transition).ok_or_else(|| {
            InventoryError::InvalidTransition {
                node_id: id.clone(),
                transition: transition.to_string(),
                state: node.provision_state.clone(),
            }
        })?;
        node.provision_state = target;
        node.last_error = None;

        self.transitions
            .lock()
            .map_err(|_| InventoryError::Lock)?
            .push((id.clone(), transition.to_string()));
        Ok(())
    }

    fn provision_snapshot(&self, id: &NodeId) -> Result<Option<ProvisionSnapshot>> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(mut script) = self.snapshot_scripts.get_mut(id) {
            if let Some(snapshot) = script.next() {
                return Ok(snapshot);
            }
        }

        Ok(self.nodes.get(id).map(|n| n.snapshot()))
    }
}

/// Orchestration service replaying scripted stack snapshots and event batches.
///
/// Stack lookups ignore the requested name; each call returns the next
/// scripted snapshot. Each `events_since` call returns the next batch, and an
/// empty batch once the script is exhausted.
pub struct ScriptedOrchestration {
    stacks: Mutex<Script<Option<StackSnapshot>>>,
    events: Mutex<VecDeque<Vec<StackEvent>>>,
    markers: Mutex<Vec<Option<String>>>,
    stack_fetches: AtomicUsize,
}

impl ScriptedOrchestration {
    pub fn new(
        stacks: impl IntoIterator<Item = Option<StackSnapshot>>,
        events: impl IntoIterator<Item = Vec<StackEvent>>,
    ) -> Self {
        Self {
            stacks: Mutex::new(Script::new(stacks)),
            events: Mutex::new(events.into_iter().collect()),
            markers: Mutex::new(Vec::new()),
            stack_fetches: AtomicUsize::new(0),
        }
    }

    /// A service that always reports the same stack and no events
    pub fn fixed(stack: Option<StackSnapshot>) -> Self {
        Self::new([stack], [])
    }

    /// Markers passed to `events_since`, in call order
    pub fn markers(&self) -> Vec<Option<String>> {
        self.markers.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn event_fetches(&self) -> usize {
        self.markers.lock().map(|m| m.len()).unwrap_or_default()
    }

    pub fn stack_fetches(&self) -> usize {
        self.stack_fetches.load(Ordering::SeqCst)
    }
}

impl OrchestrationClient for ScriptedOrchestration {
    fn get_stack(&self, _name_or_id: &str) -> Result<Option<StackSnapshot>> {
        self.stack_fetches.fetch_add(1, Ordering::SeqCst);
        let mut stacks = self.stacks.lock().map_err(|_| InventoryError::Lock)?;
        Ok(stacks.next().flatten())
    }

    fn events_since(&self, _stack_id: &str, marker: Option<&str>) -> Result<Vec<StackEvent>> {
        self.markers
            .lock()
            .map_err(|_| InventoryError::Lock)?
            .push(marker.map(str::to_string));
        let mut events = self.events.lock().map_err(|_| InventoryError::Lock)?;
        Ok(events.pop_front().unwrap_or_default())
    }
}

/// Compute service replaying scripted hypervisor statistics
pub struct ScriptedCompute {
    stats: Mutex<Script<HypervisorStats>>,
    fetches: AtomicUsize,
}

impl ScriptedCompute {
    pub fn new(stats: impl IntoIterator<Item = HypervisorStats>) -> Self {
        Self {
            stats: Mutex::new(Script::new(stats)),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ComputeClient for ScriptedCompute {
    fn hypervisor_statistics(&self) -> Result<HypervisorStats> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut stats = self.stats.lock().map_err(|_| InventoryError::Lock)?;
        Ok(stats.next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn node(id: &str, state: ProvisionState) -> NodeDescriptor {
        NodeDescriptor::new(id, state)
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let inventory = InMemoryInventory::with_nodes([
            node("c", ProvisionState::Available),
            node("a", ProvisionState::Active).with_associated(true),
            node("b", ProvisionState::Available).with_maintenance(true),
        ]);

        let all: Vec<_> = inventory
            .list_nodes(&NodeFilter::all())
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(all, vec!["a".into(), "b".into(), NodeId::from("c")]);

        let free = inventory
            .list_nodes(&NodeFilter::all().associated(false).maintenance(false))
            .unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id.as_str(), "c");
    }

    #[test]
    fn test_update_capabilities_records_call() {
        let inventory = InMemoryInventory::with_nodes([node("n1", ProvisionState::Available)]);
        let caps = CapabilitySet::parse("profile:compute").unwrap();
        inventory
            .update_node_capabilities(&"n1".into(), &caps)
            .unwrap();

        assert_eq!(inventory.update_count(), 1);
        let stored = inventory.get_node(&"n1".into()).unwrap().unwrap();
        assert_eq!(stored.profile(), Some("compute"));
    }

    #[test]
    fn test_update_unknown_or_rejected_node() {
        let inventory = InMemoryInventory::with_nodes([node("n1", ProvisionState::Available)]);
        let caps = CapabilitySet::new();
        assert!(matches!(
            inventory.update_node_capabilities(&"missing".into(), &caps),
            Err(InventoryError::NodeNotFound(_))
        ));

        inventory.reject_updates(&"n1".into(), "locked by conductor");
        assert!(matches!(
            inventory.update_node_capabilities(&"n1".into(), &caps),
            Err(InventoryError::Rejected { .. })
        ));
        assert_eq!(inventory.update_count(), 0);
    }

    #[test]
    fn test_set_provision_state() {
        let inventory = InMemoryInventory::with_nodes([node("n1", ProvisionState::Manageable)]);
        inventory.set_provision_state(&"n1".into(), "provide").unwrap();
        let snapshot = inventory.provision_snapshot(&"n1".into()).unwrap().unwrap();
        assert_eq!(snapshot.state, ProvisionState::Available);
        assert_eq!(inventory.transitions(), vec![("n1".into(), "provide".to_string())]);

        assert!(matches!(
            inventory.set_provision_state(&"n1".into(), "levitate"),
            Err(InventoryError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_scripted_snapshots_are_sticky() {
        let inventory = InMemoryInventory::new();
        let id = NodeId::from("n1");
        inventory.script_snapshots(
            &id,
            [
                Some(ProvisionSnapshot::new(ProvisionState::Cleaning)),
                Some(ProvisionSnapshot::new(ProvisionState::Available)),
            ],
        );

        let states: Vec<_> = (0..3)
            .map(|_| inventory.provision_snapshot(&id).unwrap().unwrap().state)
            .collect();
        assert_eq!(
            states,
            vec![
                ProvisionState::Cleaning,
                ProvisionState::Available,
                ProvisionState::Available
            ]
        );
        assert_eq!(inventory.snapshot_fetches(), 3);
    }

    #[test]
    fn test_scripted_orchestration() {
        let event = StackEvent {
            id: "aaa".into(),
            resource_name: "stack".into(),
            status: "CREATE_IN_PROGRESS".into(),
            reason: String::new(),
            time: Utc.with_ymd_and_hms(2015, 10, 14, 2, 25, 21).unwrap(),
        };
        let orchestration = ScriptedOrchestration::new(
            [Some(StackSnapshot::new("id", "overcloud", "CREATE_IN_PROGRESS")), None],
            [vec![event]],
        );

        assert!(orchestration.get_stack("overcloud").unwrap().is_some());
        assert!(orchestration.get_stack("overcloud").unwrap().is_none());
        assert!(orchestration.get_stack("overcloud").unwrap().is_none());
        assert_eq!(orchestration.events_since("id", None).unwrap().len(), 1);
        assert!(orchestration.events_since("id", Some("aaa")).unwrap().is_empty());
        assert_eq!(orchestration.markers(), vec![None, Some("aaa".to_string())]);
        assert_eq!(orchestration.stack_fetches(), 3);
    }

    #[test]
    fn test_scripted_compute() {
        let compute = ScriptedCompute::new([HypervisorStats::default(), HypervisorStats::new(1, 1, 1)]);
        assert_eq!(compute.hypervisor_statistics().unwrap().count, 0);
        assert_eq!(compute.hypervisor_statistics().unwrap().count, 1);
        assert_eq!(compute.hypervisor_statistics().unwrap().count, 1);
        assert_eq!(compute.fetches(), 3);
    }
}
