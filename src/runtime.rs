//! Runtime for executing sessions
//!
//! The executor drives the workflow graph; the traits are the seams to the
//! stage implementations and the outside world.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{CapabilityRegistry, SessionRuntime};
pub use traits::{Capability, ConsoleSink, InputSource, MessageSink, StageOutput, StdinSource};

use crate::state_machine::routing::Stage;
use crate::state_machine::state::{Recommendation, SessionState};
use thiserror::Error;

/// Process-level runtime failures. Everything else degrades to a fallback
/// message inside the responsible capability.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read external input: {0}")]
    Input(#[from] std::io::Error),

    #[error("no capability registered for stage {0:?}")]
    MissingCapability(Stage),
}

/// Final report assembled once the session completes.
///
/// Empty when the session was ended by a termination token before a
/// recommendation was produced.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub recommendation: Option<Recommendation>,
}

impl SessionReport {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            recommendation: state.recommendation.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendation.is_none()
    }
}
