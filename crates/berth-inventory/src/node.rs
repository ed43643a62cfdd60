//! Inventory client trait
//!
//! The InventoryClient is the node provisioning subsystem as berth sees it.

use berth_types::{CapabilitySet, NodeDescriptor, NodeId, ProvisionSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Filter applied when listing nodes. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFilter {
    /// Match on the maintenance flag
    pub maintenance: Option<bool>,

    /// Match on whether the node is bound to an instance
    pub associated: Option<bool>,
}

impl NodeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn maintenance(mut self, maintenance: bool) -> Self {
        self.maintenance = Some(maintenance);
        self
    }

    pub fn associated(mut self, associated: bool) -> Self {
        self.associated = Some(associated);
        self
    }

    pub fn matches(&self, node: &NodeDescriptor) -> bool {
        self.maintenance.map_or(true, |m| node.maintenance == m)
            && self.associated.map_or(true, |a| node.associated == a)
    }
}

/// Node provisioning subsystem
pub trait InventoryClient: Send + Sync {
    /// List nodes matching the filter
    fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeDescriptor>>;

    /// Get a node by ID
    fn get_node(&self, id: &NodeId) -> Result<Option<NodeDescriptor>>;

    /// Replace a node's persisted capability set
    fn update_node_capabilities(&self, id: &NodeId, capabilities: &CapabilitySet) -> Result<()>;

    /// Request a provision-state transition (`provide`, `manage`, ...)
    fn set_provision_state(&self, id: &NodeId, transition: &str) -> Result<()>;

    /// Current provision state and last error; `None` when the node is gone
    fn provision_snapshot(&self, id: &NodeId) -> Result<Option<ProvisionSnapshot>> {
        Ok(self.get_node(id)?.map(|node| node.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_types::ProvisionState;

    #[test]
    fn test_filter_matching() {
        let free = NodeDescriptor::new("a", ProvisionState::Available);
        let busy = NodeDescriptor::new("b", ProvisionState::Active).with_associated(true);
        let broken = NodeDescriptor::new("c", ProvisionState::Available).with_maintenance(true);

        let filter = NodeFilter::all().associated(false).maintenance(false);
        assert!(filter.matches(&free));
        assert!(!filter.matches(&busy));
        assert!(!filter.matches(&broken));
        assert!(NodeFilter::all().matches(&broken));
    }
}
