//! Node descriptors
//!
//! A [`NodeDescriptor`] is the inventory's view of one hardware node. The
//! inventory subsystem owns the node lifecycle; berth only reads descriptors
//! and replaces their capability set through an explicit update call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capabilities::CapabilitySet;
use crate::error::{Result, TypesError};
use crate::ids::NodeId;

/// Provisioning state of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisionState {
    Enroll,
    Verifying,
    Manageable,
    Inspecting,
    InspectFailed,
    Available,
    Deploying,
    WaitCallBack,
    DeployFailed,
    Active,
    Deleting,
    Cleaning,
    CleanWait,
    CleanFailed,
    Error,
    Rebuild,
    /// Any state name this crate does not know about
    Other(String),
}

impl ProvisionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Enroll => "enroll",
            Self::Verifying => "verifying",
            Self::Manageable => "manageable",
            Self::Inspecting => "inspecting",
            Self::InspectFailed => "inspect failed",
            Self::Available => "available",
            Self::Deploying => "deploying",
            Self::WaitCallBack => "wait call-back",
            Self::DeployFailed => "deploy failed",
            Self::Active => "active",
            Self::Deleting => "deleting",
            Self::Cleaning => "cleaning",
            Self::CleanWait => "clean wait",
            Self::CleanFailed => "clean failed",
            Self::Error => "error",
            Self::Rebuild => "rebuild",
            Self::Other(s) => s,
        }
    }

    /// Whether a fresh profile may be committed to a node in this state
    pub fn accepts_assignment(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the node is visible to a deployment (free or already serving)
    pub fn is_deployable(&self) -> bool {
        matches!(self, Self::Available | Self::Active)
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProvisionState {
    fn from(value: &str) -> Self {
        match value {
            "enroll" => Self::Enroll,
            "verifying" => Self::Verifying,
            "manageable" => Self::Manageable,
            "inspecting" => Self::Inspecting,
            "inspect failed" => Self::InspectFailed,
            "available" => Self::Available,
            "deploying" => Self::Deploying,
            "wait call-back" => Self::WaitCallBack,
            "deploy failed" => Self::DeployFailed,
            "active" => Self::Active,
            "deleting" => Self::Deleting,
            "cleaning" => Self::Cleaning,
            "clean wait" => Self::CleanWait,
            "clean failed" => Self::CleanFailed,
            "error" => Self::Error,
            "rebuild" => Self::Rebuild,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ProvisionState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ProvisionState> for String {
    fn from(value: ProvisionState) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ProvisionState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Inventory view of a hardware node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node identifier
    pub id: NodeId,

    /// Persisted capability set
    #[serde(default)]
    pub capabilities: CapabilitySet,

    /// Current provisioning state
    pub provision_state: ProvisionState,

    /// Node is in maintenance mode
    #[serde(default)]
    pub maintenance: bool,

    /// Node is bound to a deployed instance
    #[serde(default)]
    pub associated: bool,

    /// Last error reported by the provisioning subsystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<NodeId>, provision_state: ProvisionState) -> Self {
        Self {
            id: id.into(),
            capabilities: CapabilitySet::new(),
            provision_state,
            maintenance: false,
            associated: false,
            last_error: None,
        }
    }

    /// Set the capability set from its flat encoding
    pub fn with_capability_string(mut self, raw: &str) -> Result<Self> {
        self.capabilities = CapabilitySet::parse(raw)?;
        Ok(self)
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_maintenance(mut self, maintenance: bool) -> Self {
        self.maintenance = maintenance;
        self
    }

    pub fn with_associated(mut self, associated: bool) -> Self {
        self.associated = associated;
        self
    }

    pub fn with_last_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    /// Check the descriptor invariants that deserialization cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(TypesError::InvalidNode("empty node id".into()));
        }
        Ok(())
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Committed profile, if any
    pub fn profile(&self) -> Option<&str> {
        self.capabilities.profile()
    }

    /// Whether the node carries a `<profile>_profile` marker with an accepted value.
    ///
    /// Values are compared case-insensitively.
    pub fn is_candidate_for(&self, profile: &str, accepted_values: &[String]) -> bool {
        self.capabilities
            .get(&candidate_marker(profile))
            .map(|value| {
                accepted_values
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(value))
            })
            .unwrap_or(false)
    }

    /// Whether any capability key is a candidate marker
    pub fn has_any_candidate_marker(&self) -> bool {
        self.capabilities
            .iter()
            .any(|(key, _)| key.ends_with(CANDIDATE_SUFFIX) && key != CANDIDATE_SUFFIX)
    }

    /// Current provisioning snapshot as reported to pollers
    pub fn snapshot(&self) -> ProvisionSnapshot {
        ProvisionSnapshot {
            state: self.provision_state.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

const CANDIDATE_SUFFIX: &str = "_profile";

/// Capability key a discovery step writes for a node eligible for `profile`
pub fn candidate_marker(profile: &str) -> String {
    format!("{profile}{CANDIDATE_SUFFIX}")
}

/// State of a node as fetched by a poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionSnapshot {
    pub state: ProvisionState,
    pub last_error: Option<String>,
}

impl ProvisionSnapshot {
    pub fn new(state: ProvisionState) -> Self {
        Self {
            state,
            last_error: None,
        }
    }

    pub fn with_error(state: ProvisionState, error: impl Into<String>) -> Self {
        Self {
            state,
            last_error: Some(error.into()),
        }
    }

    /// The last error, if it carries any text
    pub fn error_text(&self) -> Option<&str> {
        self.last_error.as_deref().filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> Vec<String> {
        vec!["1".into(), "true".into()]
    }

    #[test]
    fn test_state_names_round_trip() {
        for name in ["available", "wait call-back", "clean failed", "manageable"] {
            assert_eq!(ProvisionState::from(name).as_str(), name);
        }
        assert_eq!(
            ProvisionState::from("adopting"),
            ProvisionState::Other("adopting".into())
        );
    }

    #[test]
    fn test_assignment_and_deployable_states() {
        assert!(ProvisionState::Available.accepts_assignment());
        assert!(!ProvisionState::Active.accepts_assignment());
        assert!(ProvisionState::Active.is_deployable());
        assert!(!ProvisionState::Cleaning.is_deployable());
    }

    #[test]
    fn test_candidate_marker_values() {
        let node = NodeDescriptor::new("n1", ProvisionState::Available)
            .with_capability_string("compute_profile:True,control_profile:0")
            .unwrap();
        assert!(node.is_candidate_for("compute", &accepted()));
        assert!(!node.is_candidate_for("control", &accepted()));
        assert!(!node.is_candidate_for("storage", &accepted()));
        assert!(node.has_any_candidate_marker());
    }

    #[test]
    fn test_plain_profile_key_is_not_a_marker() {
        let node = NodeDescriptor::new("n1", ProvisionState::Available)
            .with_capability_string("profile:compute,boot_option:local")
            .unwrap();
        assert!(!node.has_any_candidate_marker());
        assert_eq!(node.profile(), Some("compute"));
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "id": "ABCDEFGH",
            "capabilities": "profile:compute",
            "provision_state": "active"
        }"#;
        let node: NodeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(node.provision_state, ProvisionState::Active);
        assert_eq!(node.profile(), Some("compute"));
        assert_eq!(node.capabilities().to_capability_string(), "profile:compute");
        assert!(!node.maintenance);
        node.validate().unwrap();
    }

    #[test]
    fn test_empty_id_rejected() {
        let node = NodeDescriptor::new("  ", ProvisionState::Available);
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_snapshot_error_text() {
        assert_eq!(ProvisionSnapshot::with_error(ProvisionState::Enroll, "").error_text(), None);
        let snap = ProvisionSnapshot::with_error(ProvisionState::Enroll, "node on fire");
        assert_eq!(snap.error_text(), Some("node on fire"));
    }
}
