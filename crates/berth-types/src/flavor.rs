//! Flavor descriptors
//!
//! A flavor is a deployment role: a name, the profile its nodes must carry,
//! and how many nodes the caller wants. Flavors are supplied per invocation
//! and never persisted by berth.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};
use crate::node::candidate_marker;

/// Extra-spec key carrying a flavor's target profile
pub const PROFILE_EXTRA_SPEC: &str = "capabilities:profile";

/// A deployment role with its target profile and requested scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorSpec {
    /// Flavor name
    pub name: String,

    /// Profile nodes must carry to serve this flavor
    #[serde(default)]
    pub profile: Option<String>,

    /// Number of nodes requested
    #[serde(default)]
    pub scale: u32,
}

impl FlavorSpec {
    /// Create a validated flavor
    pub fn new(name: impl Into<String>, profile: Option<&str>, scale: u32) -> Result<Self> {
        let spec = Self {
            name: name.into(),
            profile: profile.map(str::to_string),
            scale,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Flavor whose profile equals its own name
    pub fn named(name: impl Into<String>, scale: u32) -> Result<Self> {
        let name = name.into();
        let profile = name.clone();
        Self::new(name, Some(&profile), scale)
    }

    /// Build a flavor from the compute service's extra specs.
    ///
    /// The profile comes from the `capabilities:profile` key; an empty value
    /// means no profile.
    pub fn from_extra_specs(
        name: impl Into<String>,
        extra_specs: &HashMap<String, String>,
        scale: u32,
    ) -> Result<Self> {
        let profile = extra_specs
            .get(PROFILE_EXTRA_SPEC)
            .map(String::as_str)
            .filter(|p| !p.is_empty());
        Self::new(name, profile, scale)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TypesError::InvalidFlavor {
                name: self.name.clone(),
                reason: "empty name".into(),
            });
        }

        if let Some(profile) = &self.profile {
            if profile.is_empty() {
                return Err(TypesError::InvalidFlavor {
                    name: self.name.clone(),
                    reason: "empty profile".into(),
                });
            }
            if profile.contains(',') || profile.contains(':') {
                return Err(TypesError::InvalidFlavor {
                    name: self.name.clone(),
                    reason: format!("profile '{profile}' contains a capability delimiter"),
                });
            }
        }

        Ok(())
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Capability key marking a node as a candidate for this flavor's profile
    pub fn candidate_marker(&self) -> Option<String> {
        self.profile().map(candidate_marker)
    }
}
