//! File-backed inventory
//!
//! The inventory snapshot is a JSON array of node descriptors. Every write
//! through the [`InventoryClient`] interface is saved back to the file.

use std::path::{Path, PathBuf};

use berth_inventory::{InMemoryInventory, InventoryClient, InventoryError, NodeFilter};
use berth_types::{CapabilitySet, NodeDescriptor, NodeId, ProvisionSnapshot};
use tracing::debug;

use crate::error::CliResult;

/// Inventory snapshot stored in a JSON file
pub struct FileInventory {
    path: PathBuf,
    nodes: InMemoryInventory,
}

impl FileInventory {
    pub fn open(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path)?;
        let nodes: Vec<NodeDescriptor> = serde_json::from_str(&raw)?;
        for node in &nodes {
            node.validate()?;
        }

        debug!(path = %path.display(), nodes = nodes.len(), "Loaded inventory snapshot");
        Ok(Self {
            path,
            nodes: InMemoryInventory::with_nodes(nodes),
        })
    }

    fn save(&self) -> berth_inventory::Result<()> {
        let json = serde_json::to_string_pretty(&self.nodes.nodes())
            .map_err(|e| InventoryError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| InventoryError::Storage(e.to_string()))
    }
}

impl InventoryClient for FileInventory {
    fn list_nodes(&self, filter: &NodeFilter) -> berth_inventory::Result<Vec<NodeDescriptor>> {
        self.nodes.list_nodes(filter)
    }

    fn get_node(&self, id: &NodeId) -> berth_inventory::Result<Option<NodeDescriptor>> {
        self.nodes.get_node(id)
    }

    fn update_node_capabilities(
        &self,
        id: &NodeId,
        capabilities: &CapabilitySet,
    ) -> berth_inventory::Result<()> {
        self.nodes.update_node_capabilities(id, capabilities)?;
        self.save()
    }

    fn set_provision_state(&self, id: &NodeId, transition: &str) -> berth_inventory::Result<()> {
        self.nodes.set_provision_state(id, transition)?;
        self.save()
    }

    fn provision_snapshot(&self, id: &NodeId) -> berth_inventory::Result<Option<ProvisionSnapshot>> {
        self.nodes.provision_snapshot(id)
    }
}
