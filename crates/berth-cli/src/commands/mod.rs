//! CLI command implementations

pub mod caps;
pub mod node_count;
pub mod profiles;
pub mod provide;
