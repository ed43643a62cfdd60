//! Stack event watcher
//!
//! Polls an orchestration stack until its status is terminal, draining the
//! event log incrementally while the stack is in progress. The watcher keeps
//! only a watermark (the newest event seen), never the full log.

use std::sync::{Arc, Mutex};

use berth_inventory::OrchestrationClient;
use berth_types::{StackEvent, StackState, StackStatus};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::config::StackWaitConfig;
use crate::delay::Delay;
use crate::error::Result;

/// Receives each new stack event exactly once
pub trait StackEventSink: Send + Sync {
    fn emit(&self, event: &StackEvent);
}

/// Logs events as `<time> [<resource>]: <status> <reason>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl StackEventSink for TracingEventSink {
    fn emit(&self, event: &StackEvent) {
        info!(event_id = %event.id, "{}", event.log_line());
    }
}

/// Keeps every emitted event in memory
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<StackEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StackEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn ids(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.id).collect()
    }
}

impl StackEventSink for CollectingEventSink {
    fn emit(&self, event: &StackEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Newest event seen so far
#[derive(Debug, Clone, PartialEq, Eq)]
struct Watermark {
    time: DateTime<Utc>,
    id: String,
}

/// Watcher state for one wait call
#[derive(Debug, Default)]
struct StackPollState {
    watermark: Option<Watermark>,
    status: Option<StackStatus>,
}

impl StackPollState {
    fn marker(&self) -> Option<&str> {
        self.watermark.as_ref().map(|w| w.id.as_str())
    }

    fn is_new(&self, event: &StackEvent) -> bool {
        self.watermark
            .as_ref()
            .map_or(true, |w| event.sort_key() > (w.time, w.id.as_str()))
    }

    fn advance(&mut self, event: &StackEvent) {
        self.watermark = Some(Watermark {
            time: event.time,
            id: event.id.clone(),
        });
    }
}

/// Waits for orchestration stacks to settle
pub struct StackWatcher {
    orchestration: Arc<dyn OrchestrationClient>,
    delay: Arc<dyn Delay>,
    sink: Arc<dyn StackEventSink>,
    config: StackWaitConfig,
}

impl StackWatcher {
    /// Watcher logging events through `tracing`
    pub fn new(
        orchestration: Arc<dyn OrchestrationClient>,
        delay: Arc<dyn Delay>,
        config: StackWaitConfig,
    ) -> Self {
        Self {
            orchestration,
            delay,
            sink: Arc::new(TracingEventSink),
            config,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StackEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Block until the stack reaches a terminal status.
    ///
    /// Returns `true` for `*_COMPLETE`, `false` for `*_FAILED` or when the
    /// stack does not exist (or disappears). There is no loop cap.
    #[instrument(skip(self))]
    pub fn wait_for_stack_ready(&self, stack: &str) -> Result<bool> {
        let mut state = StackPollState::default();

        loop {
            let Some(snapshot) = self.orchestration.get_stack(stack)? else {
                warn!("Stack not found");
                return Ok(false);
            };

            if state.status.as_ref() != Some(&snapshot.status) {
                debug!(status = %snapshot.status, "Stack status changed");
            }

            match snapshot.status.state() {
                StackState::Complete => {
                    info!(status = %snapshot.status, "Stack is ready");
                    return Ok(true);
                }
                StackState::Failed => {
                    error!(status = %snapshot.status, "Stack failed");
                    return Ok(false);
                }
                StackState::InProgress => {
                    let emitted = self.drain_events(&snapshot.id, &mut state)?;
                    debug!(emitted, "Drained stack events");
                }
                StackState::Other => {
                    debug!(status = %snapshot.status, "Unrecognised stack status, polling again");
                }
            }

            state.status = Some(snapshot.status);
            self.delay.sleep(self.config.delay());
        }
    }

    /// Emit events newer than the watermark, oldest first
    fn drain_events(&self, stack_id: &str, state: &mut StackPollState) -> Result<usize> {
        let mut events = self.orchestration.events_since(stack_id, state.marker())?;
        events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut emitted = 0;
        for event in &events {
            if !state.is_new(event) {
                continue;
            }
            self.sink.emit(event);
            state.advance(event);
            emitted += 1;
        }
        Ok(emitted)
    }
}
