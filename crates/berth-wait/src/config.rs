//! Poller configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a provision poller does when the node disappears
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VanishedPolicy {
    /// Stop polling and report the node as vanished
    #[default]
    Resolve,
    /// Fail with `WaitError::Vanished`
    Fail,
    /// Treat the missing node like any non-goal state
    KeepPolling,
}

/// Configuration of all pollers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default)]
    pub provision: ProvisionWaitConfig,

    #[serde(default)]
    pub stack: StackWaitConfig,

    #[serde(default)]
    pub hypervisor: HypervisorWaitConfig,
}

/// Provision-state poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionWaitConfig {
    /// Maximum number of state fetches
    #[serde(default = "default_provision_loops")]
    pub max_loops: u32,

    /// Delay between fetches in seconds
    #[serde(default = "default_provision_delay")]
    pub delay_secs: u64,

    #[serde(default)]
    pub vanished: VanishedPolicy,
}

impl Default for ProvisionWaitConfig {
    fn default() -> Self {
        Self {
            max_loops: default_provision_loops(),
            delay_secs: default_provision_delay(),
            vanished: VanishedPolicy::default(),
        }
    }
}

impl ProvisionWaitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Stack event watcher. It has no loop cap; callers bound it externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackWaitConfig {
    /// Delay between stack polls in seconds
    #[serde(default = "default_stack_delay")]
    pub delay_secs: u64,
}

impl Default for StackWaitConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_stack_delay(),
        }
    }
}

impl StackWaitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Hypervisor statistics poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypervisorWaitConfig {
    #[serde(default = "default_hypervisor_loops")]
    pub max_loops: u32,

    #[serde(default = "default_hypervisor_delay")]
    pub delay_secs: u64,
}

impl Default for HypervisorWaitConfig {
    fn default() -> Self {
        Self {
            max_loops: default_hypervisor_loops(),
            delay_secs: default_hypervisor_delay(),
        }
    }
}

impl HypervisorWaitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

fn default_provision_loops() -> u32 {
    10
}

fn default_provision_delay() -> u64 {
    1
}

fn default_stack_delay() -> u64 {
    5
}

fn default_hypervisor_loops() -> u32 {
    10
}

fn default_hypervisor_delay() -> u64 {
    10
}
