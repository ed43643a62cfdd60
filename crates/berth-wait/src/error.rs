//! Wait error types

use berth_inventory::InventoryError;
use berth_types::{NodeId, ProvisionState};
use thiserror::Error;

/// Poller failures
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Node {node_id} did not reach state {goal} after {loops} polls")]
    Timeout {
        node_id: NodeId,
        goal: ProvisionState,
        loops: u32,
    },

    #[error("Node {node_id} failed to reach state {goal}, it's in {state} with error: {error}")]
    StateTransitionFailed {
        node_id: NodeId,
        goal: ProvisionState,
        state: ProvisionState,
        error: String,
    },

    #[error("Node {node_id} disappeared while waiting")]
    Vanished { node_id: NodeId },

    #[error("Hypervisor statistics did not reach the thresholds after {loops} polls")]
    HypervisorTimeout { loops: u32 },

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

impl WaitError {
    /// Whether waiting longer could change the outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::HypervisorTimeout { .. })
    }
}

/// Result type for wait operations
pub type Result<T> = std::result::Result<T, WaitError>;
