//! Orchestration stack snapshots and events

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const IN_PROGRESS_SUFFIX: &str = "_IN_PROGRESS";
const COMPLETE_SUFFIX: &str = "_COMPLETE";
const FAILED_SUFFIX: &str = "_FAILED";

/// Coarse state encoded in the suffix of a stack status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackState {
    InProgress,
    Complete,
    Failed,
    /// Status without a recognised suffix
    Other,
}

impl StackState {
    /// Whether the stack will not transition further on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Raw stack status such as `CREATE_IN_PROGRESS`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackStatus(String);

impl StackStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn state(&self) -> StackState {
        if self.0.ends_with(IN_PROGRESS_SUFFIX) {
            StackState::InProgress
        } else if self.0.ends_with(COMPLETE_SUFFIX) {
            StackState::Complete
        } else if self.0.ends_with(FAILED_SUFFIX) {
            StackState::Failed
        } else {
            StackState::Other
        }
    }

    /// Action prefix (`CREATE`, `UPDATE`, ...), when the status has a known suffix
    pub fn action(&self) -> Option<&str> {
        [IN_PROGRESS_SUFFIX, COMPLETE_SUFFIX, FAILED_SUFFIX]
            .iter()
            .find_map(|suffix| self.0.strip_suffix(suffix))
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StackStatus {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StackStatus {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Point-in-time view of an orchestration stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSnapshot {
    /// Stack identifier
    pub id: String,

    /// Stack name
    pub name: String,

    /// Current status
    pub status: StackStatus,

    /// Template parameters the stack was deployed with
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl StackSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: impl Into<StackStatus>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A single entry of a stack's event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    /// Event identifier
    pub id: String,

    /// Resource the event refers to
    pub resource_name: String,

    /// Resource status after the event
    pub status: String,

    /// Human-readable reason
    #[serde(default)]
    pub reason: String,

    /// Event timestamp
    pub time: DateTime<Utc>,
}

impl StackEvent {
    /// Ordering key: event time, then id as a stable tie-break
    pub fn sort_key(&self) -> (DateTime<Utc>, &str) {
        (self.time, self.id.as_str())
    }

    /// One-line rendering used by event logs
    pub fn log_line(&self) -> String {
        let time = self.time.format("%Y-%m-%dT%H:%M:%SZ");
        if self.reason.is_empty() {
            format!("{time} [{}]: {}", self.resource_name, self.status)
        } else {
            format!(
                "{time} [{}]: {} {}",
                self.resource_name, self.status, self.reason
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_states() {
        assert_eq!(StackStatus::from("CREATE_IN_PROGRESS").state(), StackState::InProgress);
        assert_eq!(StackStatus::from("UPDATE_COMPLETE").state(), StackState::Complete);
        assert_eq!(StackStatus::from("CREATE_FAILED").state(), StackState::Failed);
        assert_eq!(StackStatus::from("INIT").state(), StackState::Other);
        assert!(StackState::Failed.is_terminal());
        assert!(!StackState::InProgress.is_terminal());
    }

    #[test]
    fn test_status_action() {
        assert_eq!(StackStatus::from("CREATE_IN_PROGRESS").action(), Some("CREATE"));
        assert_eq!(StackStatus::from("ROLLBACK_COMPLETE").action(), Some("ROLLBACK"));
        assert_eq!(StackStatus::from("INIT").action(), None);
    }

    #[test]
    fn test_event_log_line() {
        let event = StackEvent {
            id: "aaa".into(),
            resource_name: "stack".into(),
            status: "CREATE_IN_PROGRESS".into(),
            reason: "Stack CREATE started".into(),
            time: Utc.with_ymd_and_hms(2015, 10, 14, 2, 25, 21).unwrap(),
        };
        assert_eq!(
            event.log_line(),
            "2015-10-14T02:25:21Z [stack]: CREATE_IN_PROGRESS Stack CREATE started"
        );
    }
}
