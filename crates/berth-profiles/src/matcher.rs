//! Profile matcher
//!
//! Binds nodes to flavors by their `profile` capability. Nodes that already
//! carry a flavor's profile count towards its scale; missing nodes are taken
//! from unprofiled `available` nodes tagged with a `<profile>_profile`
//! candidate marker. The outcome is counted, never raised: a single run
//! reports every unsatisfied flavor.

use std::collections::BTreeMap;
use std::sync::Arc;

use berth_inventory::{InventoryClient, NodeFilter};
use berth_types::{CapabilitySet, FlavorSpec, NodeDescriptor, NodeId, PROFILE_KEY};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::config::MatcherConfig;
use crate::error::{ProfileError, Result};
use crate::plan::{
    Assignment, AssignmentPlan, CommitFailure, FlavorPlan, FlavorStatus, SlotMatcher,
};

/// Counted outcome of a matcher run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Unsatisfied flavors, plus flavors without a profile
    pub errors: u32,

    /// Flavors with redundant or leftover nodes, plus one for idle nodes
    pub warnings: u32,

    /// Whether the plan was left uncommitted
    pub dry_run: bool,

    pub plan: AssignmentPlan,

    /// Flavors rolled back because an update was refused
    pub commit_failures: Vec<CommitFailure>,
}

impl MatchReport {
    pub fn counts(&self) -> (u32, u32) {
        (self.errors, self.warnings)
    }

    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        self.plan.assignments()
    }
}

/// Assigns and verifies node profiles against requested flavors
pub struct ProfileMatcher {
    inventory: Arc<dyn InventoryClient>,
    config: MatcherConfig,
}

impl ProfileMatcher {
    pub fn new(inventory: Arc<dyn InventoryClient>, config: MatcherConfig) -> Self {
        Self { inventory, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Run the matcher over every node not in maintenance
    pub fn assign_and_verify_inventory(
        &self,
        flavors: &BTreeMap<String, FlavorSpec>,
        assign_profiles: bool,
        dry_run: bool,
    ) -> Result<MatchReport> {
        let mut nodes = self
            .inventory
            .list_nodes(&NodeFilter::all().maintenance(false))?;
        self.assign_and_verify(&mut nodes, flavors, assign_profiles, dry_run)
    }

    /// Compute the plan and, unless `dry_run`, persist every new assignment.
    ///
    /// Each newly assigned node gets exactly one capability update, issued
    /// after all flavors have been resolved. The descriptor in `nodes` is
    /// updated to match the persisted capabilities. Flavors are committed
    /// whole: when an update is refused, the updates already made for that
    /// flavor are reverted, the flavor is reported as an error and the
    /// remaining flavors are still committed.
    #[instrument(skip(self, nodes, flavors), fields(nodes = nodes.len(), flavors = flavors.len()))]
    pub fn assign_and_verify(
        &self,
        nodes: &mut [NodeDescriptor],
        flavors: &BTreeMap<String, FlavorSpec>,
        assign_profiles: bool,
        dry_run: bool,
    ) -> Result<MatchReport> {
        let mut report = self.plan(nodes, flavors, assign_profiles)?;
        report.dry_run = dry_run;

        if dry_run {
            let pending = report.assignments().len();
            if pending > 0 {
                info!(count = pending, "Dry run: profile assignments were not persisted");
            }
            return Ok(report);
        }

        let mut assigned = 0;
        for plan in report.plan.flavors.iter_mut() {
            if plan.status != FlavorStatus::Satisfied || plan.selected.is_empty() {
                continue;
            }
            let Some(profile) = plan.profile.clone() else {
                continue;
            };

            match self.commit_flavor(nodes, &plan.flavor, &profile, &plan.selected) {
                Ok(()) => assigned += plan.selected.len(),
                Err(failure) => {
                    error!(
                        flavor = %plan.flavor,
                        node_id = %failure.node_id,
                        reason = %failure.reason,
                        "Could not assign profile {} to node {}; flavor {} was rolled back",
                        profile,
                        failure.node_id,
                        plan.flavor
                    );
                    plan.status = FlavorStatus::CommitFailed;
                    plan.missing = u32::try_from(plan.selected.len()).unwrap_or(u32::MAX);
                    plan.selected.clear();
                    report.errors += 1;
                    report.commit_failures.push(failure);
                }
            }
        }

        info!(
            errors = report.errors,
            warnings = report.warnings,
            assigned,
            "Profile verification finished"
        );
        Ok(report)
    }

    /// Persist one flavor's selections, reverting them all if one is refused
    fn commit_flavor(
        &self,
        nodes: &mut [NodeDescriptor],
        flavor: &str,
        profile: &str,
        selected: &[NodeId],
    ) -> std::result::Result<(), CommitFailure> {
        // (index into nodes, capabilities before the update)
        let mut applied: Vec<(usize, CapabilitySet)> = Vec::with_capacity(selected.len());

        for node_id in selected {
            let Some(idx) = nodes.iter().position(|n| &n.id == node_id) else {
                continue;
            };
            let previous = nodes[idx].capabilities.clone();
            let updated = previous
                .with(PROFILE_KEY, profile)
                .map_err(ProfileError::from)
                .and_then(|capabilities| -> Result<CapabilitySet> {
                    self.inventory
                        .update_node_capabilities(node_id, &capabilities)?;
                    Ok(capabilities)
                });

            match updated {
                Ok(capabilities) => {
                    nodes[idx].capabilities = capabilities;
                    applied.push((idx, previous));
                    info!(node_id = %node_id, flavor, profile, "Assigned profile to node");
                }
                Err(err) => {
                    let not_restored = self.revert(nodes, applied);
                    return Err(CommitFailure {
                        flavor: flavor.to_string(),
                        node_id: node_id.clone(),
                        reason: err.to_string(),
                        not_restored,
                    });
                }
            }
        }
        Ok(())
    }

    /// Restore earlier capabilities, newest first; returns nodes left changed
    fn revert(
        &self,
        nodes: &mut [NodeDescriptor],
        applied: Vec<(usize, CapabilitySet)>,
    ) -> Vec<NodeId> {
        let mut not_restored = Vec::new();
        for (idx, previous) in applied.into_iter().rev() {
            let node = &mut nodes[idx];
            match self.inventory.update_node_capabilities(&node.id, &previous) {
                Ok(()) => {
                    debug!(node_id = %node.id, "Reverted profile assignment");
                    node.capabilities = previous;
                }
                Err(err) => {
                    error!(node_id = %node.id, error = %err, "Failed to revert profile assignment");
                    not_restored.push(node.id.clone());
                }
            }
        }
        not_restored
    }

    /// Compute the assignment plan without touching the inventory
    pub fn plan(
        &self,
        nodes: &[NodeDescriptor],
        flavors: &BTreeMap<String, FlavorSpec>,
        assign_profiles: bool,
    ) -> Result<MatchReport> {
        for flavor in flavors.values() {
            flavor.validate()?;
        }

        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| nodes[a].id.cmp(&nodes[b].id));

        let mut report = MatchReport::default();
        let mut plans: Vec<FlavorPlan> = Vec::with_capacity(flavors.len());
        let mut counted = vec![false; nodes.len()];
        // (index into plans, profile) for every flavor that is verified
        let mut verified: Vec<(usize, String)> = Vec::new();

        for (name, flavor) in flavors {
            if flavor.scale == 0 {
                debug!(flavor = %name, "Skipping flavor with zero scale");
                plans.push(FlavorPlan::new(name, flavor, FlavorStatus::Skipped));
                continue;
            }

            let Some(profile) = flavor.profile() else {
                if flavors.len() > 1 {
                    error!(flavor = %name, "Flavor {} has no profile associated", name);
                    report.errors += 1;
                } else {
                    debug!(flavor = %name, "Flavor has no profile, skipping verification");
                }
                plans.push(FlavorPlan::new(name, flavor, FlavorStatus::MissingProfile));
                continue;
            };

            let mut plan = FlavorPlan::new(name, flavor, FlavorStatus::Unsatisfied);
            for &idx in &order {
                let node = &nodes[idx];
                if counted[idx] || node.profile() != Some(profile) {
                    continue;
                }
                if !self.config.count_profiled_in_any_state
                    && !node.provision_state.is_deployable()
                {
                    continue;
                }
                counted[idx] = true;
                plan.satisfying.push(node.id.clone());
            }

            let exact = u32::try_from(plan.satisfying.len()).unwrap_or(u32::MAX);
            if exact > flavor.scale {
                plan.redundant = exact - flavor.scale;
                warn!(
                    flavor = %name,
                    profile = %profile,
                    redundant = plan.redundant,
                    "{} nodes with profile {} won't be used for deployment now",
                    plan.redundant,
                    profile
                );
                report.warnings += 1;
            }
            plan.missing = flavor.scale.saturating_sub(exact);
            if plan.missing == 0 {
                plan.status = FlavorStatus::Satisfied;
            }

            verified.push((plans.len(), profile.to_string()));
            plans.push(plan);
        }

        let candidates = verified
            .iter()
            .map(|(_, profile)| {
                order
                    .iter()
                    .copied()
                    .filter(|&idx| self.is_assignable(&nodes[idx], profile))
                    .collect()
            })
            .collect();
        let mut slots = SlotMatcher::new(candidates);

        if assign_profiles {
            for (slot, (plan_idx, _)) in verified.iter().enumerate() {
                let plan = &mut plans[*plan_idx];
                if plan.missing > 0 && slots.fill(slot, plan.missing) {
                    plan.status = FlavorStatus::Satisfied;
                }
            }

            // Read selections only now; later flavors may have rerouted nodes.
            for (slot, (plan_idx, _)) in verified.iter().enumerate() {
                let plan = &mut plans[*plan_idx];
                if plan.status != FlavorStatus::Satisfied || plan.missing == 0 {
                    continue;
                }
                let mut selected: Vec<NodeId> = slots
                    .held_by(slot)
                    .into_iter()
                    .map(|idx| nodes[idx].id.clone())
                    .collect();
                selected.sort();
                plan.selected = selected;
                plan.missing = 0;
            }
        }

        for plan in plans.iter().filter(|p| p.status == FlavorStatus::Unsatisfied) {
            let profile = plan.profile.as_deref().unwrap_or_default();
            error!(
                flavor = %plan.flavor,
                profile = %profile,
                missing = plan.missing,
                "Only {} of {} requested ironic nodes are tagged to profile {} (for flavor {})",
                plan.satisfying.len(),
                plan.scale,
                profile,
                plan.flavor
            );
            warn!(
                "Recommendation: tag more nodes using ironic node-update <NODE> replace \
                 properties/capabilities=profile:{},boot_option:local",
                profile
            );
            report.errors += 1;
        }

        let taken = |idx: usize| counted[idx] || slots.is_taken(idx);

        // Without assignment, unused candidates only feed the idle count.
        let leftover_flavors: &[(usize, String)] = if assign_profiles {
            verified.as_slice()
        } else {
            &[]
        };
        for (plan_idx, profile) in leftover_flavors {
            let leftovers: Vec<NodeId> = order
                .iter()
                .copied()
                .filter(|&idx| !taken(idx) && self.is_spare_candidate(&nodes[idx], profile))
                .map(|idx| nodes[idx].id.clone())
                .collect();
            if leftovers.is_empty() {
                continue;
            }

            let plan = &mut plans[*plan_idx];
            warn!(
                flavor = %plan.flavor,
                profile = %profile,
                leftover = leftovers.len(),
                "{} candidate nodes for profile {} won't be used",
                leftovers.len(),
                profile
            );
            plan.leftover_candidates = leftovers;
            report.warnings += 1;
        }

        let mut idle_nodes = Vec::new();
        if !verified.is_empty() {
            let idle: Vec<&NodeDescriptor> = order
                .iter()
                .copied()
                .filter(|&idx| !taken(idx))
                .map(|idx| &nodes[idx])
                .filter(|node| node.profile().is_none() && node.provision_state.is_deployable())
                .filter(|node| {
                    !leftover_flavors
                        .iter()
                        .any(|(_, profile)| self.is_spare_candidate(node, profile))
                })
                .collect();

            if !idle.is_empty() {
                let tagged = idle.iter().filter(|n| n.has_any_candidate_marker()).count();
                warn!(
                    idle = idle.len(),
                    "There are {} ironic nodes with no profile that will not be used",
                    idle.len()
                );
                if tagged > 0 {
                    debug!(
                        tagged,
                        "Idle nodes carrying candidate markers for profiles no flavor requested"
                    );
                }
                report.warnings += 1;
                idle_nodes = idle.into_iter().map(|node| node.id.clone()).collect();
            }
        }

        report.plan = AssignmentPlan {
            flavors: plans,
            idle_nodes,
        };
        Ok(report)
    }

    /// Unprofiled, `available` and tagged for `profile`
    fn is_assignable(&self, node: &NodeDescriptor, profile: &str) -> bool {
        node.profile().is_none()
            && node.provision_state.accepts_assignment()
            && node.is_candidate_for(profile, &self.config.candidate_values)
    }

    /// Unprofiled, deployable and tagged for `profile`
    fn is_spare_candidate(&self, node: &NodeDescriptor, profile: &str) -> bool {
        node.profile().is_none()
            && node.provision_state.is_deployable()
            && node.is_candidate_for(profile, &self.config.candidate_values)
    }
}
