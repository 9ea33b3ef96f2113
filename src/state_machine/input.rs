//! External input classification
//!
//! The suspension boundary blocks for one line of input, then folds it into
//! the session state with `absorb_input`. Classification is pure so it can be
//! tested without any I/O.

use super::state::{Message, Role, SessionState, StateUpdate};

/// Tokens that end the session immediately, matched case-insensitively
/// against the trimmed input.
pub const TERMINATION_TOKENS: [&str; 4] = ["exit", "quit", ":q", "bye"];

/// Phrases signalling the user intends to eat something
const CONSUMPTION_PHRASES: [&str; 10] = [
    "i want to eat",
    "can i eat",
    "i'm eating",
    "eating",
    "i'll eat",
    "let me eat",
    "should i eat",
    "is it ok to eat",
    "can eat",
    "want to eat",
];

/// Specific food terms the classifier recognizes
const FOOD_TERMS: [&str; 10] = [
    "apple",
    "banana",
    "toast",
    "cappuccino",
    "cheese",
    "ham",
    "kfc",
    "pizza",
    "burger",
    "chicken",
];

/// Numerals accepted by the quantity-adjacency pattern
const NUMERALS: [&str; 8] = ["1", "2", "3", "4", "5", "one", "two", "three"];

/// Keywords that mark a general meal-planning question rather than a
/// specific food request. Routes back to the nutritionist (routing guard 4).
const MEAL_PLANNING_KEYWORDS: [&str; 6] = [
    "meal plan",
    "diet plan",
    "nutrition plan",
    "what should i eat",
    "meal ideas",
    "diet advice",
];

/// How one unit of external input was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A termination token; the session ends with no further classification
    Terminate,
    /// An ordinary message
    Message {
        /// True iff the input asks about eating a specific food
        is_food_request: bool,
    },
}

/// Classify one unit of raw input.
pub fn classify(raw: &str) -> InputKind {
    let lowered = raw.trim().to_lowercase();

    if TERMINATION_TOKENS.contains(&lowered.as_str()) {
        return InputKind::Terminate;
    }

    let has_consumption_phrase = CONSUMPTION_PHRASES.iter().any(|p| lowered.contains(p));
    let has_food_term = FOOD_TERMS.iter().any(|f| lowered.contains(f));

    // "2 apples", "three banana" style quantity mentions count as a food
    // request even without a consumption phrase.
    let numeral_adjacent = NUMERALS.iter().any(|num| {
        FOOD_TERMS
            .iter()
            .any(|food| lowered.contains(&format!("{num} {food}")))
    });

    InputKind::Message {
        is_food_request: (has_consumption_phrase && has_food_term) || numeral_adjacent,
    }
}

/// True iff the input is a general meal-planning question
pub fn is_meal_planning_request(input: &str) -> bool {
    let lowered = input.to_lowercase();
    MEAL_PLANNING_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Fold one unit of external input into a partial update.
///
/// Termination tokens complete the session without touching the history.
/// Everything else appends a user entry, replaces `current_input`, and sets
/// `food_request` if the input classified as one and none is pending.
/// `awaiting_input` is cleared in every case.
pub fn absorb_input(state: &SessionState, raw: &str) -> StateUpdate {
    let trimmed = raw.trim();

    let mut update = StateUpdate::new().awaiting_input(false);
    update.current_input = Some(trimmed.to_string());

    match classify(trimmed) {
        InputKind::Terminate => update.complete_session(),
        InputKind::Message { is_food_request } => {
            update.messages.push(Message::new(Role::User, trimmed));
            if is_food_request && state.food_request.is_none() {
                update.food_request = Some(trimmed.to_string());
            }
            update
        }
    }
}
