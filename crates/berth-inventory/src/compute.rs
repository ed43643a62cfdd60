//! Compute client trait

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Aggregate statistics over every registered hypervisor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypervisorStats {
    /// Number of hypervisors
    pub count: u32,
    /// Total memory in MiB
    pub memory_mb: u64,
    /// Total virtual CPUs
    pub vcpus: u32,
}

impl HypervisorStats {
    pub fn new(count: u32, memory_mb: u64, vcpus: u32) -> Self {
        Self {
            count,
            memory_mb,
            vcpus,
        }
    }

    /// Whether every figure reaches its threshold
    pub fn meets(&self, nodes: u32, memory_mb: u64, vcpus: u32) -> bool {
        self.count >= nodes && self.memory_mb >= memory_mb && self.vcpus >= vcpus
    }
}

/// Compute service exposing hypervisor statistics
pub trait ComputeClient: Send + Sync {
    fn hypervisor_statistics(&self) -> Result<HypervisorStats>;
}
