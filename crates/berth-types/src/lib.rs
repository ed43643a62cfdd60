//! Berth Types - Core descriptors for bare-metal deployment orchestration
//!
//! Berth binds discovered hardware nodes to deployment roles (flavors) and
//! watches external, eventually-consistent systems until they settle. This
//! crate holds the passive data shapes every other berth crate reads.
//!
//! ## Key Concepts
//!
//! - **CapabilitySet**: `key:value,key:value` mapping persisted on each node
//! - **NodeDescriptor**: Inventory view of a node (id, capabilities, provision state)
//! - **FlavorSpec**: A deployment role with a target profile and a requested scale
//! - **StackSnapshot / StackEvent**: Orchestration stack status and its event log
//!
//! ## Architectural Boundaries
//!
//! - `berth-types` owns: descriptors and the capability codec
//! - `berth-inventory` owns: collaborator interfaces that produce these descriptors
//! - `berth-profiles` / `berth-wait` own: the decision logic consuming them

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod capabilities;
pub mod error;
pub mod flavor;
pub mod ids;
pub mod node;
pub mod stack;

// Re-export main types
pub use capabilities::{CapabilitySet, PROFILE_KEY};
pub use error::{Result, TypesError};
pub use flavor::FlavorSpec;
pub use ids::NodeId;
pub use node::{candidate_marker, NodeDescriptor, ProvisionSnapshot, ProvisionState};
pub use stack::{StackEvent, StackSnapshot, StackState, StackStatus};
