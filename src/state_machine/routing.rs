//! Routing policy
//!
//! A pure, total function from session state to the next stage. Decisions
//! are derived from the underlying fields, never from the informational
//! `phase` marker, so the two cannot diverge.

use super::input::is_meal_planning_request;
use super::state::{Role, SessionState};

/// Stage identifiers for the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Profile collection, food prompt, and final recommendation
    Trainer,
    /// Metric computation and meal-planning advice
    Nutritionist,
    /// Food lookup and analysis
    FoodSpecialist,
    /// Suspension boundary: block for one unit of external input
    Human,
    /// Terminal: the session is over
    Complete,
}

impl Stage {
    /// History role for messages emitted by this stage, if it emits any
    pub fn role(self) -> Option<Role> {
        match self {
            Stage::Trainer => Some(Role::Trainer),
            Stage::Nutritionist => Some(Role::Nutritionist),
            Stage::FoodSpecialist => Some(Role::FoodSpecialist),
            Stage::Human | Stage::Complete => None,
        }
    }
}

/// Select the next stage via an ordered guard chain; first match wins.
///
/// The order is load-bearing: e.g. a pending food request (guard 6) must be
/// analyzed before the trainer is asked for a recommendation (guard 7). The
/// final guard is unconditional, so every state maps to a stage.
pub fn next_stage(state: &SessionState) -> Stage {
    // A completed session routes nowhere else, regardless of other fields.
    if state.session_complete {
        return Stage::Complete;
    }

    // 1. Paused for input
    if state.awaiting_input {
        return Stage::Human;
    }

    // 2. Profile still being collected
    if !state.profile_complete() {
        return Stage::Trainer;
    }

    // 3. Profile done, metrics not yet computed
    if state.nutrition.is_none() {
        return Stage::Nutritionist;
    }

    // 4. Metrics done, but the user asked a general meal-planning question
    if is_meal_planning_request(&state.current_input) {
        return Stage::Nutritionist;
    }

    // 5. Nothing to analyze yet and the user hasn't been prompted for food
    if state.food_request.is_none() && !state.awaiting_food_request {
        return Stage::Trainer;
    }

    // 6. A food request is pending analysis
    if state.food_request.is_some() && state.food_analysis.is_none() {
        return Stage::FoodSpecialist;
    }

    // 7. Everything gathered; produce the final recommendation
    if state.food_analysis.is_some() && state.recommendation.is_none() {
        return Stage::Trainer;
    }

    // 8. Default: wait for more input
    Stage::Human
}
