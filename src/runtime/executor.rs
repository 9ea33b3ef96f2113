//! Session runtime executor
//!
//! Drives the workflow graph: invoke the current stage, merge its update,
//! check for termination, consult the routing policy, repeat. The suspension
//! boundary (the `Human` stage) is the only place the loop blocks.

use super::traits::{Capability, InputSource, MessageSink};
use super::{RuntimeError, SessionReport};
use crate::state_machine::state::{Message, StateUpdate};
use crate::state_machine::{absorb_input, next_stage, SessionState, Stage};
use std::collections::HashMap;
use std::sync::Arc;

/// Ceiling on stage invocations between two suspensions. Routing normally
/// reaches the boundary in a handful of steps; hitting the ceiling means a
/// guard loop is spinning, so control is handed back to the human.
const MAX_STEPS_PER_RESUME: u32 = 16;

/// Routing-relevant view of the state, used to detect steps that made no
/// progress a guard could observe.
#[derive(Debug, Clone, PartialEq)]
struct RoutingFingerprint {
    history_len: usize,
    awaiting_input: bool,
    profile_complete: bool,
    has_nutrition: bool,
    has_food_request: bool,
    awaiting_food_request: bool,
    has_analysis: bool,
    has_recommendation: bool,
    session_complete: bool,
    current_input: String,
}

impl RoutingFingerprint {
    fn of(state: &SessionState) -> Self {
        Self {
            history_len: state.history.len(),
            awaiting_input: state.awaiting_input,
            profile_complete: state.profile_complete(),
            has_nutrition: state.nutrition.is_some(),
            has_food_request: state.food_request.is_some(),
            awaiting_food_request: state.awaiting_food_request,
            has_analysis: state.food_analysis.is_some(),
            has_recommendation: state.recommendation.is_some(),
            session_complete: state.session_complete,
            current_input: state.current_input.clone(),
        }
    }
}

/// Registry of capabilities keyed by stage identifier
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<Stage, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, stage: Stage, capability: Arc<dyn Capability>) -> Self {
        self.capabilities.insert(stage, capability);
        self
    }

    fn get(&self, stage: Stage) -> Result<&Arc<dyn Capability>, RuntimeError> {
        self.capabilities
            .get(&stage)
            .ok_or(RuntimeError::MissingCapability(stage))
    }
}

/// The workflow executor for one session.
///
/// Owns the session state exclusively: stages observe a fully-merged snapshot
/// and return partial updates; this loop is the single writer.
pub struct SessionRuntime<I, O>
where
    I: InputSource,
    O: MessageSink,
{
    state: SessionState,
    registry: CapabilityRegistry,
    input: I,
    sink: O,
}

impl<I, O> SessionRuntime<I, O>
where
    I: InputSource,
    O: MessageSink,
{
    pub fn new(registry: CapabilityRegistry, input: I, sink: O) -> Self {
        Self {
            state: SessionState::new(),
            registry,
            input,
            sink,
        }
    }

    /// Drive the session from the entry stage to termination.
    ///
    /// Only an input-boundary I/O failure ends the session abnormally.
    pub async fn run(mut self) -> Result<SessionReport, RuntimeError> {
        tracing::info!(session_id = %self.state.session_id, "starting session");

        let mut stage = Stage::Trainer;
        let mut steps_since_input: u32 = 0;

        loop {
            match stage {
                Stage::Complete => break,

                Stage::Human => {
                    self.sink.prompt();
                    match self.input.read_input().await? {
                        Some(raw) => {
                            tracing::debug!(input = %raw, "absorbing external input");
                            let update = absorb_input(&self.state, &raw);
                            self.state.apply(update);
                        }
                        None => {
                            // Input stream exhausted: same as a termination token
                            tracing::info!("input stream closed, ending session");
                            self.state
                                .apply(StateUpdate::new().awaiting_input(false).complete_session());
                        }
                    }
                    steps_since_input = 0;
                }

                stage_id => {
                    let before = RoutingFingerprint::of(&self.state);
                    let capability = self.registry.get(stage_id)?;
                    let output = capability.run(&self.state).await;

                    let mut update = output.update;
                    if let Some(text) = output.message {
                        if let Some(role) = stage_id.role() {
                            self.sink.emit(role, &text);
                            update.messages.push(Message::new(role, text));
                        }
                    }
                    self.state.apply(update);
                    steps_since_input += 1;

                    if self.state.session_complete {
                        stage = Stage::Complete;
                        continue;
                    }

                    let next = next_stage(&self.state);

                    // Anti-stall: a stage that is routed straight back to
                    // itself without changing anything a guard can see would
                    // spin forever. Hand control back to the human instead.
                    if next == stage_id && RoutingFingerprint::of(&self.state) == before {
                        tracing::warn!(?stage_id, "stage made no routable progress, suspending");
                        self.state.apply(StateUpdate::new().awaiting_input(true));
                        stage = Stage::Human;
                        continue;
                    }
                    if steps_since_input >= MAX_STEPS_PER_RESUME {
                        tracing::warn!(
                            ?stage_id,
                            steps = steps_since_input,
                            "step ceiling reached, suspending"
                        );
                        self.state.apply(StateUpdate::new().awaiting_input(true));
                        stage = Stage::Human;
                        continue;
                    }

                    stage = next;
                    continue;
                }
            }

            if self.state.session_complete {
                stage = Stage::Complete;
            } else {
                stage = next_stage(&self.state);
            }
        }

        tracing::info!(
            session_id = %self.state.session_id,
            steps = self.state.history.len(),
            "session complete"
        );
        Ok(SessionReport::from_state(&self.state))
    }
}
