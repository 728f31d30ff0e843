//! Conversation state machine
//!
//! A single transition function maps the current state and one user
//! message to a reply decision and the next state. The only side effect
//! is the reading append performed through the history it is handed.

mod decision;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use decision::Decision;
pub use state::{ContextTag, ConversationState, Step};
pub use transition::transition;
