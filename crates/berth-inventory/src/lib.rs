//! Berth Inventory - Collaborator interfaces and implementations
//!
//! The decision logic in berth never talks to a cloud API directly. It goes
//! through the narrow interfaces defined here:
//!
//! - **InventoryClient**: Lists nodes, updates their capabilities, reports provision state
//! - **OrchestrationClient**: Looks up stacks and drains their event logs
//! - **ComputeClient**: Reports aggregate hypervisor statistics
//!
//! ## In-Memory vs Remote
//!
//! The crate provides in-memory implementations suitable for development and
//! testing. The scripted variants replay a fixed sequence of responses, so
//! pollers can be driven through eventually-consistent transitions
//! deterministically. Remote backends implement the same traits.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod compute;
pub mod error;
pub mod memory;
pub mod node;
pub mod orchestration;

// Re-exports
pub use compute::{ComputeClient, HypervisorStats};
pub use error::{InventoryError, Result};
pub use memory::{CapabilityUpdate, InMemoryInventory, ScriptedCompute, ScriptedOrchestration};
pub use node::{InventoryClient, NodeFilter};
pub use orchestration::OrchestrationClient;
