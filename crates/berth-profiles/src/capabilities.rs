//! Capability updates on inventory nodes

use berth_inventory::InventoryClient;
use berth_types::{CapabilitySet, NodeDescriptor};
use tracing::debug;

use crate::error::Result;

/// Merge `pairs` into a node's capabilities and persist the result.
///
/// The full merged set replaces the persisted one; the descriptor is only
/// updated once the inventory accepted it.
pub fn add_node_capabilities(
    inventory: &dyn InventoryClient,
    node: &mut NodeDescriptor,
    pairs: &CapabilitySet,
) -> Result<CapabilitySet> {
    let updated = node.capabilities.merged(pairs);
    inventory.update_node_capabilities(&node.id, &updated)?;
    debug!(node_id = %node.id, capabilities = %updated, "Node capabilities updated");

    node.capabilities = updated.clone();
    Ok(updated)
}
