//! Orchestration client trait

use berth_types::{StackEvent, StackSnapshot};

use crate::error::Result;

/// Orchestration service holding deployment stacks
pub trait OrchestrationClient: Send + Sync {
    /// Look up a stack by name or ID; `None` when it does not exist
    fn get_stack(&self, name_or_id: &str) -> Result<Option<StackSnapshot>>;

    /// Events of a stack (and its nested stacks) after `marker`, oldest first.
    ///
    /// A `None` marker returns the log from the beginning.
    fn events_since(&self, stack_id: &str, marker: Option<&str>) -> Result<Vec<StackEvent>>;
}
