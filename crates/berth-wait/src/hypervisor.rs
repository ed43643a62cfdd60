//! Hypervisor readiness
//!
//! After nodes are provided, the compute service only sees them once the
//! hypervisor statistics catch up. These helpers check the aggregate figures
//! against minimum thresholds.

use berth_inventory::{ComputeClient, HypervisorStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::HypervisorWaitConfig;
use crate::delay::Delay;
use crate::error::{Result, WaitError};

/// Minimum aggregate figures the compute service must report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypervisorThresholds {
    pub nodes: u32,
    pub memory_mb: u64,
    pub vcpus: u32,
}

impl Default for HypervisorThresholds {
    fn default() -> Self {
        Self {
            nodes: 1,
            memory_mb: 0,
            vcpus: 0,
        }
    }
}

impl HypervisorThresholds {
    pub fn nodes(nodes: u32) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }
}

/// Current statistics, or `None` while any threshold is unmet
pub fn check_hypervisor_stats(
    compute: &dyn ComputeClient,
    thresholds: &HypervisorThresholds,
) -> Result<Option<HypervisorStats>> {
    let stats = compute.hypervisor_statistics()?;
    if stats.meets(thresholds.nodes, thresholds.memory_mb, thresholds.vcpus) {
        Ok(Some(stats))
    } else {
        debug!(
            count = stats.count,
            memory_mb = stats.memory_mb,
            vcpus = stats.vcpus,
            "Hypervisor statistics below thresholds"
        );
        Ok(None)
    }
}

/// Poll [`check_hypervisor_stats`] until the thresholds are met
#[instrument(skip(compute, delay, config))]
pub fn wait_for_hypervisor_stats(
    compute: &dyn ComputeClient,
    delay: &dyn Delay,
    config: &HypervisorWaitConfig,
    thresholds: &HypervisorThresholds,
) -> Result<HypervisorStats> {
    for poll in 1..=config.max_loops {
        if let Some(stats) = check_hypervisor_stats(compute, thresholds)? {
            info!(polls = poll, count = stats.count, "Hypervisor statistics ready");
            return Ok(stats);
        }
        if poll < config.max_loops {
            delay.sleep(config.delay());
        }
    }

    Err(WaitError::HypervisorTimeout {
        loops: config.max_loops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::RecordingDelay;
    use berth_inventory::ScriptedCompute;

    #[test]
    fn test_check_thresholds() {
        let compute = ScriptedCompute::new([HypervisorStats::new(1, 1, 1)]);
        let thresholds = HypervisorThresholds {
            nodes: 1,
            memory_mb: 1,
            vcpus: 1,
        };
        assert_eq!(
            check_hypervisor_stats(&compute, &thresholds).unwrap(),
            Some(HypervisorStats::new(1, 1, 1))
        );
        assert_eq!(
            check_hypervisor_stats(&compute, &HypervisorThresholds::nodes(2)).unwrap(),
            None
        );
    }

    #[test]
    fn test_wait_until_ready() {
        let compute = ScriptedCompute::new([
            HypervisorStats::default(),
            HypervisorStats::default(),
            HypervisorStats::new(2, 4096, 8),
        ]);
        let delay = RecordingDelay::new();

        let stats = wait_for_hypervisor_stats(
            &compute,
            &delay,
            &HypervisorWaitConfig::default(),
            &HypervisorThresholds::nodes(2),
        )
        .unwrap();

        assert_eq!(stats.count, 2);
        assert_eq!(compute.fetches(), 3);
        assert_eq!(delay.count(), 2);
    }

    #[test]
    fn test_wait_times_out() {
        let compute = ScriptedCompute::new([HypervisorStats::default()]);
        let delay = RecordingDelay::new();
        let config = HypervisorWaitConfig {
            max_loops: 4,
            delay_secs: 10,
        };

        let result = wait_for_hypervisor_stats(&compute, &delay, &config, &HypervisorThresholds::default());
        assert!(matches!(result, Err(WaitError::HypervisorTimeout { loops: 4 })));
        assert_eq!(compute.fetches(), 4);
        assert_eq!(delay.total().as_secs(), 30);
    }
}
