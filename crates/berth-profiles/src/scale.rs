//! Scale resolution and the node-count pre-check
//!
//! Scales are looked up per deployment parameter (`ControllerCount`,
//! `ComputeCount`, ...). A value passed by the user wins, then the value
//! recorded on an existing stack, then the default.

use std::collections::{BTreeMap, HashMap};

use berth_inventory::{InventoryClient, NodeFilter};
use berth_types::FlavorSpec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProfileError, Result};

/// Where requested node counts come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleSource {
    defaults: BTreeMap<String, u32>,
    user: HashMap<String, u32>,
    stack: Option<HashMap<String, String>>,
}

impl ScaleSource {
    /// Source with the given defaults; every default is a requested parameter
    pub fn new(defaults: BTreeMap<String, u32>) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn with_user_parameter(mut self, parameter: impl Into<String>, count: u32) -> Self {
        self.user.insert(parameter.into(), count);
        self
    }

    pub fn with_user_parameters(mut self, parameters: impl IntoIterator<Item = (String, u32)>) -> Self {
        self.user.extend(parameters);
        self
    }

    /// Parameters of the stack being updated
    pub fn with_stack_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.stack = Some(parameters);
        self
    }

    pub fn defaults(&self) -> &BTreeMap<String, u32> {
        &self.defaults
    }

    /// Requested count for one parameter.
    ///
    /// With an existing stack the parameter must be present on it and hold an
    /// integer, even when the user overrides it.
    pub fn resolve(&self, parameter: &str) -> Result<u32> {
        let current = match &self.stack {
            Some(stack) => {
                let raw = stack.get(parameter).ok_or_else(|| missing(parameter))?;
                let count = raw.trim().parse::<u32>().map_err(|_| {
                    ProfileError::InvalidScaleParameter {
                        parameter: parameter.to_string(),
                        value: raw.clone(),
                    }
                })?;
                Some(count)
            }
            None => None,
        };

        if let Some(&count) = self.user.get(parameter) {
            return Ok(count);
        }
        match current {
            Some(count) => Ok(count),
            None => self
                .defaults
                .get(parameter)
                .copied()
                .ok_or_else(|| missing(parameter)),
        }
    }

    /// Sum of the resolved counts of every default parameter
    pub fn requested_total(&self) -> Result<u32> {
        self.defaults.keys().try_fold(0u32, |total, parameter| -> Result<u32> {
            Ok(total.saturating_add(self.resolve(parameter)?))
        })
    }

    /// Set each flavor's scale from the parameter mapped to it
    pub fn apply_to_flavors(
        &self,
        flavors: &mut BTreeMap<String, FlavorSpec>,
        parameters: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (name, flavor) in flavors.iter_mut() {
            let parameter = parameters
                .get(name)
                .ok_or_else(|| ProfileError::UnmappedFlavor(name.clone()))?;
            flavor.scale = self.resolve(parameter)?;
        }
        Ok(())
    }
}

fn missing(parameter: &str) -> ProfileError {
    ProfileError::MissingScaleParameter {
        parameter: parameter.to_string(),
    }
}

/// Result of the node-count pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCountCheck {
    pub enough: bool,
    pub requested: u32,
    pub usable: u32,
}

/// Compare the requested node count with the nodes that can host it.
///
/// Usable nodes are those already bound to an instance plus the free ones
/// that are not in maintenance.
pub fn check_nodes_count(inventory: &dyn InventoryClient, source: &ScaleSource) -> Result<NodeCountCheck> {
    let requested = source.requested_total()?;

    let associated = inventory
        .list_nodes(&NodeFilter::all().associated(true))?
        .len();
    let available = inventory
        .list_nodes(&NodeFilter::all().associated(false).maintenance(false))?
        .len();
    let usable = u32::try_from(associated + available).unwrap_or(u32::MAX);

    let check = NodeCountCheck {
        enough: requested <= usable,
        requested,
        usable,
    };
    if check.enough {
        debug!(requested, usable, "Enough nodes for the requested scale");
    } else {
        warn!(
            requested,
            usable, "Not enough nodes - available: {}, requested: {}", usable, requested
        );
    }
    Ok(check)
}
