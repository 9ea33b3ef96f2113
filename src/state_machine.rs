//! Core session state machine
//!
//! Pure data model, input classification, and routing. No I/O lives here;
//! the runtime drives these pieces.

pub mod input;
pub mod routing;
pub mod state;

#[cfg(test)]
mod proptests;

pub use input::{absorb_input, classify, InputKind};
pub use routing::{next_stage, Stage};
pub use state::{SessionState, StateUpdate};
