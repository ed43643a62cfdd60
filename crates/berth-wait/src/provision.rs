//! Provision-state poller
//!
//! Polls a single node until it reaches a goal state, reports a failure, or
//! the loop budget runs out. At most `max_loops` snapshots are fetched, with
//! a constant delay between consecutive fetches.

use std::sync::Arc;

use berth_inventory::InventoryClient;
use berth_types::{NodeId, ProvisionState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{ProvisionWaitConfig, VanishedPolicy};
use crate::delay::Delay;
use crate::error::{Result, WaitError};

/// How a successful wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// The node reached the goal state
    Reached { polls: u32 },
    /// The node disappeared and the vanished policy resolves the wait
    Vanished { polls: u32 },
}

impl WaitOutcome {
    pub fn polls(&self) -> u32 {
        match self {
            Self::Reached { polls } | Self::Vanished { polls } => *polls,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }
}

/// Waits for nodes to reach a provision state
pub struct ProvisionWaiter {
    inventory: Arc<dyn InventoryClient>,
    delay: Arc<dyn Delay>,
    config: ProvisionWaitConfig,
}

impl ProvisionWaiter {
    pub fn new(
        inventory: Arc<dyn InventoryClient>,
        delay: Arc<dyn Delay>,
        config: ProvisionWaitConfig,
    ) -> Self {
        Self {
            inventory,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &ProvisionWaitConfig {
        &self.config
    }

    pub(crate) fn inventory(&self) -> &dyn InventoryClient {
        self.inventory.as_ref()
    }

    /// Block until `node_id` reaches `goal`
    #[instrument(skip(self), fields(node_id = %node_id, goal = %goal))]
    pub fn wait_for_state(&self, node_id: &NodeId, goal: &ProvisionState) -> Result<WaitOutcome> {
        let max_loops = self.config.max_loops;

        for poll in 1..=max_loops {
            match self.inventory.provision_snapshot(node_id)? {
                None => match self.config.vanished {
                    VanishedPolicy::Resolve => {
                        warn!(polls = poll, "Node disappeared, nothing left to wait for");
                        return Ok(WaitOutcome::Vanished { polls: poll });
                    }
                    VanishedPolicy::Fail => {
                        warn!(polls = poll, "Node disappeared while waiting");
                        return Err(WaitError::Vanished {
                            node_id: node_id.clone(),
                        });
                    }
                    VanishedPolicy::KeepPolling => {
                        debug!(poll, "Node not found, polling again");
                    }
                },
                Some(snapshot) if snapshot.state == *goal => {
                    info!(polls = poll, "Node reached goal state");
                    return Ok(WaitOutcome::Reached { polls: poll });
                }
                Some(snapshot) => {
                    if let Some(error) = snapshot.error_text() {
                        return Err(WaitError::StateTransitionFailed {
                            node_id: node_id.clone(),
                            goal: goal.clone(),
                            state: snapshot.state.clone(),
                            error: error.to_string(),
                        });
                    }
                    debug!(poll, state = %snapshot.state, "Node not in goal state yet");
                }
            }

            if poll < max_loops {
                self.delay.sleep(self.config.delay());
            }
        }

        Err(WaitError::Timeout {
            node_id: node_id.clone(),
            goal: goal.clone(),
            loops: max_loops,
        })
    }
}
