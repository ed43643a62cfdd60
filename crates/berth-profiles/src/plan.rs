//! Assignment plan
//!
//! Candidate nodes are matched to flavor deficits as a bipartite graph in
//! which every flavor has a capacity equal to its deficit. Flavors are filled
//! one at a time in a fixed order; filling a later flavor may move nodes
//! between earlier flavors along an augmenting path, but never takes a slot
//! away from them. A flavor that cannot be filled completely is rolled back
//! so that none of its tentative picks survive.

use std::collections::BTreeMap;

use berth_types::{FlavorSpec, NodeId};
use serde::{Deserialize, Serialize};

/// Outcome of a single flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlavorStatus {
    /// Requested scale is zero
    Skipped,
    /// Flavor has no profile; only an error when other flavors are present
    MissingProfile,
    /// Enough nodes carry (or will carry) the profile
    Satisfied,
    /// Scale could not be reached
    Unsatisfied,
    /// Enough candidates were found but persisting them failed; rolled back
    CommitFailed,
}

/// A flavor whose selected nodes could not all be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFailure {
    pub flavor: String,

    /// Node whose update was refused
    pub node_id: NodeId,

    pub reason: String,

    /// Nodes of the flavor whose earlier update could not be undone
    pub not_restored: Vec<NodeId>,
}

/// Per-flavor part of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorPlan {
    /// Flavor name
    pub flavor: String,

    /// Target profile
    pub profile: Option<String>,

    /// Requested number of nodes
    pub scale: u32,

    /// Nodes already carrying the profile and counted towards scale
    pub satisfying: Vec<NodeId>,

    /// Nodes newly selected to receive the profile
    pub selected: Vec<NodeId>,

    /// Exact matches beyond scale
    pub redundant: u32,

    /// Nodes still needed after selection
    pub missing: u32,

    /// Deployable candidates for this profile that were left unused
    pub leftover_candidates: Vec<NodeId>,

    pub status: FlavorStatus,
}

impl FlavorPlan {
    pub(crate) fn new(name: &str, flavor: &FlavorSpec, status: FlavorStatus) -> Self {
        Self {
            flavor: name.to_string(),
            profile: flavor.profile.clone(),
            scale: flavor.scale,
            satisfying: Vec::new(),
            selected: Vec::new(),
            redundant: 0,
            missing: 0,
            leftover_candidates: Vec::new(),
            status,
        }
    }

    /// Nodes carrying the profile once the plan is committed
    pub fn assigned_total(&self) -> usize {
        self.satisfying.len() + self.selected.len()
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == FlavorStatus::Satisfied
    }
}

/// A node newly bound to a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub node_id: NodeId,
    pub flavor: String,
    pub profile: String,
}

/// Complete plan for one matcher invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    /// Flavors in processing order
    pub flavors: Vec<FlavorPlan>,

    /// Unprofiled deployable nodes that no flavor can use
    pub idle_nodes: Vec<NodeId>,
}

impl AssignmentPlan {
    pub fn flavor(&self, name: &str) -> Option<&FlavorPlan> {
        self.flavors.iter().find(|plan| plan.flavor == name)
    }

    /// Every new assignment, ordered by node id
    pub fn assignments(&self) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> = self
            .flavors
            .iter()
            .filter_map(|plan| plan.profile.as_ref().map(|profile| (plan, profile)))
            .flat_map(|(plan, profile)| {
                plan.selected.iter().map(move |node_id| Assignment {
                    node_id: node_id.clone(),
                    flavor: plan.flavor.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        assignments.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        assignments
    }
}

/// Capacity-constrained bipartite matching of nodes to flavors.
///
/// Nodes and flavors are plain indices owned by the caller. Candidate lists
/// are in preference order; the first free candidate wins.
#[derive(Debug)]
pub(crate) struct SlotMatcher {
    candidates: Vec<Vec<usize>>,
    owner: BTreeMap<usize, usize>,
}

impl SlotMatcher {
    pub(crate) fn new(candidates: Vec<Vec<usize>>) -> Self {
        Self {
            candidates,
            owner: BTreeMap::new(),
        }
    }

    /// Take `deficit` more nodes for `flavor`, or none at all
    pub(crate) fn fill(&mut self, flavor: usize, deficit: u32) -> bool {
        let checkpoint = self.owner.clone();
        for _ in 0..deficit {
            let mut visited = vec![false; self.candidates.len()];
            if !self.augment(flavor, &mut visited) {
                self.owner = checkpoint;
                return false;
            }
        }
        true
    }

    fn augment(&mut self, flavor: usize, visited: &mut [bool]) -> bool {
        visited[flavor] = true;

        let free = self.candidates[flavor]
            .iter()
            .copied()
            .find(|node| !self.owner.contains_key(node));
        if let Some(node) = free {
            self.owner.insert(node, flavor);
            return true;
        }

        for i in 0..self.candidates[flavor].len() {
            let node = self.candidates[flavor][i];
            let holder = match self.owner.get(&node) {
                Some(&holder) if holder != flavor && !visited[holder] => holder,
                _ => continue,
            };
            if self.augment(holder, visited) {
                self.owner.insert(node, flavor);
                return true;
            }
        }
        false
    }

    pub(crate) fn is_taken(&self, node: usize) -> bool {
        self.owner.contains_key(&node)
    }

    /// Nodes held by `flavor`, ascending
    pub(crate) fn held_by(&self, flavor: usize) -> Vec<usize> {
        self.owner
            .iter()
            .filter(|&(_, &holder)| holder == flavor)
            .map(|(&node, _)| node)
            .collect()
    }
}
