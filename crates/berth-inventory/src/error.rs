//! Collaborator error types

use berth_types::{NodeId, ProvisionState};
use thiserror::Error;

/// Errors reported by inventory, orchestration and compute collaborators
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Node {node_id} cannot '{transition}' from state '{state}'")]
    InvalidTransition {
        node_id: NodeId,
        transition: String,
        state: ProvisionState,
    },

    #[error("Update rejected for node {node_id}: {reason}")]
    Rejected { node_id: NodeId, reason: String },

    #[error("Invalid capabilities: {0}")]
    Capabilities(#[from] berth_types::TypesError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Lock error")]
    Lock,
}

/// Result type for collaborator operations
pub type Result<T> = std::result::Result<T, InventoryError>;
