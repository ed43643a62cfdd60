//! Berth Profiles - Profile assignment and verification
//!
//! Deployment roles (flavors) are bound to hardware nodes through the
//! `profile` capability. This crate decides which nodes serve which flavor:
//!
//! - **ProfileMatcher**: Counts nodes already carrying a flavor's profile and
//!   closes deficits from tagged candidate nodes
//! - **AssignmentPlan**: Per-flavor breakdown of satisfying, selected,
//!   redundant and missing nodes
//! - **ScaleSource**: Resolves requested node counts from user input, an
//!   existing stack and defaults
//!
//! ## Counted Outcomes
//!
//! Unsatisfied flavors are reported as error counts rather than returned as
//! `Err`, so a single run reports every problem at once. `Err` means a
//! collaborator failed.
//!
//! ## Architectural Boundaries
//!
//! The matcher is the only writer of the `profile` capability. It issues at
//! most one update per node and only after every flavor has been resolved.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod capabilities;
pub mod config;
pub mod error;
pub mod matcher;
pub mod plan;
pub mod scale;

// Re-exports
pub use capabilities::add_node_capabilities;
pub use config::MatcherConfig;
pub use error::{ProfileError, Result};
pub use matcher::{MatchReport, ProfileMatcher};
pub use plan::{Assignment, AssignmentPlan, CommitFailure, FlavorPlan, FlavorStatus};
pub use scale::{check_nodes_count, NodeCountCheck, ScaleSource};
