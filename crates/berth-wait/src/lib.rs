//! Berth Wait - Bounded readiness pollers
//!
//! The systems berth talks to are eventually consistent. The pollers in this
//! crate turn their state and event streams into a verdict:
//!
//! - **ProvisionWaiter**: Waits for a node to reach a provision state
//! - **StackWatcher**: Drains a stack's event log until it settles
//! - **set_nodes_state**: Moves a batch of nodes through a transition
//! - **wait_for_hypervisor_stats**: Waits for the compute service to see nodes
//!
//! ## Blocking Model
//!
//! Every poller blocks the calling thread. The only suspension points are the
//! delays between polls, which go through an injectable [`Delay`]. Tests use
//! [`RecordingDelay`] and never sleep.
//!
//! ## Architectural Boundaries
//!
//! Pollers only read collaborator state; the single write they issue is the
//! transition request in [`set_nodes_state`]. Retrying past a loop budget is
//! left to the caller.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod delay;
pub mod error;
pub mod hypervisor;
pub mod provision;
pub mod stack;
pub mod transition;

// Re-exports
pub use config::{HypervisorWaitConfig, ProvisionWaitConfig, StackWaitConfig, VanishedPolicy, WaitConfig};
pub use delay::{Delay, RecordingDelay, ThreadDelay};
pub use error::{Result, WaitError};
pub use hypervisor::{check_hypervisor_stats, wait_for_hypervisor_stats, HypervisorThresholds};
pub use provision::{ProvisionWaiter, WaitOutcome};
pub use stack::{CollectingEventSink, StackEventSink, StackWatcher, TracingEventSink};
pub use transition::{set_nodes_state, TransitionOutcome};
