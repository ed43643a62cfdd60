//! Matcher configuration

use serde::{Deserialize, Serialize};

/// Configuration for the profile matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Count exact profile matches towards scale whatever the provisioning
    /// state. When false only `available` and `active` nodes count.
    #[serde(default = "default_count_any_state")]
    pub count_profiled_in_any_state: bool,

    /// Marker values that make a node a candidate (case-insensitive)
    #[serde(default = "default_candidate_values")]
    pub candidate_values: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            count_profiled_in_any_state: default_count_any_state(),
            candidate_values: default_candidate_values(),
        }
    }
}

impl MatcherConfig {
    /// Only count exact matches on deployable nodes
    pub fn strict_states(mut self) -> Self {
        self.count_profiled_in_any_state = false;
        self
    }
}

fn default_count_any_state() -> bool {
    true
}

fn default_candidate_values() -> Vec<String> {
    vec!["1".to_string(), "true".to_string()]
}
