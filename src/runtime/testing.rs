//! Mock implementations for testing
//!
//! These mocks let executor tests run a whole session without touching
//! stdin or stdout.

use super::traits::{Capability, InputSource, MessageSink, StageOutput};
use crate::state_machine::state::Role;
use crate::state_machine::SessionState;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

// ============================================================================
// Scripted input
// ============================================================================

/// Input source that replays a fixed script, then reports end of stream
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_input(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Input source whose read always fails, for process-failure paths
pub struct FailingInput;

#[async_trait]
impl InputSource for FailingInput {
    async fn read_input(&mut self) -> io::Result<Option<String>> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "input gone"))
    }
}

// ============================================================================
// Collecting sink
// ============================================================================

/// Sink that records every emitted message
#[derive(Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<(Role, String)>>>,
}

impl CollectingSink {
    /// Handle onto the recorded messages, usable after the sink moves into
    /// the runtime
    pub fn events(&self) -> Arc<Mutex<Vec<(Role, String)>>> {
        Arc::clone(&self.events)
    }
}

impl MessageSink for CollectingSink {
    fn emit(&mut self, role: Role, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((role, message.to_string()));
    }
}

// ============================================================================
// Static capability
// ============================================================================

/// Capability that replays queued outputs, falling back to an empty output
/// when the queue runs dry
pub struct StaticCapability {
    outputs: Mutex<VecDeque<StageOutput>>,
}

impl StaticCapability {
    pub fn new(outputs: impl IntoIterator<Item = StageOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
        }
    }

    /// A capability that never says or changes anything
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Capability for StaticCapability {
    async fn run(&self, _state: &SessionState) -> StageOutput {
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}
