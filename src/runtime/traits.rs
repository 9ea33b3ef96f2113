//! Trait abstractions for runtime I/O
//!
//! These traits are the seams between the orchestrator and its
//! collaborators: processing stages, the external input boundary, and the
//! console. Tests substitute deterministic mocks for all three.

use crate::state_machine::state::{Role, StateUpdate};
use crate::state_machine::SessionState;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

// ============================================================================
// Capability
// ============================================================================

/// What a stage hands back to the executor: an optional outbound message and
/// a partial state update. The executor echoes the message, appends it to the
/// history under the stage's role, and merges the update exactly once.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub message: Option<String>,
    pub update: StateUpdate,
}

impl StageOutput {
    pub fn new(update: StateUpdate) -> Self {
        Self {
            message: None,
            update,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A pluggable processing stage.
///
/// Implementations must be total: any internal failure (a knowledge source
/// coming up empty, a computation that cannot proceed) is converted into a
/// deterministic fallback update plus an explanatory message, never an error
/// the orchestrator has to reason about. Implementations read the state but
/// never mutate it; all writes go through the returned update.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn run(&self, state: &SessionState) -> StageOutput;
}

#[async_trait]
impl<T: Capability + ?Sized> Capability for Arc<T> {
    async fn run(&self, state: &SessionState) -> StageOutput {
        (**self).run(state).await
    }
}

// ============================================================================
// Input boundary
// ============================================================================

/// Source of external input units for the suspension boundary.
///
/// `Ok(None)` means the stream is exhausted; the executor treats that as a
/// termination token. An `Err` is a process-level failure and is the only
/// condition allowed to end the session abnormally.
#[async_trait]
pub trait InputSource: Send {
    async fn read_input(&mut self) -> io::Result<Option<String>>;
}

/// Sink for user-facing messages. Message production is part of a stage's
/// return value rather than a print side effect, so the core stays testable
/// away from any console.
pub trait MessageSink: Send {
    /// Emit one outbound message
    fn emit(&mut self, role: Role, message: &str);

    /// Called right before the boundary blocks for input
    fn prompt(&mut self) {}
}

// ============================================================================
// Production adapters
// ============================================================================

/// Line-oriented input from stdin
pub struct StdinSource {
    reader: BufReader<Stdin>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinSource {
    async fn read_input(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
        }
    }
}

/// Console sink: stage messages go to stdout, labeled by role
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn emit(&mut self, role: Role, message: &str) {
        println!("\n{}: {}", role.label(), message);
    }

    fn prompt(&mut self) {
        use std::io::Write;
        print!("\nYou: ");
        let _ = std::io::stdout().flush();
    }
}
