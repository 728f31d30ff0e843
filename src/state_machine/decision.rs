//! Reply decisions produced by state transitions

use super::state::ContextTag;

/// What to answer for a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Fixed text, optionally with quick-action options
    Scripted { text: String, options: Vec<String> },

    /// The reply has to come from the generation collaborator
    NeedsGeneration {
        context: ContextTag,
        /// User text the generated reply should address
        payload: String,
        /// Scripted lead-in shown before the generated text
        acknowledgment: String,
    },
}

impl Decision {
    pub fn scripted(text: impl Into<String>) -> Self {
        Decision::Scripted {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn scripted_with_options(text: impl Into<String>, options: &[&str]) -> Self {
        Decision::Scripted {
            text: text.into(),
            options: options.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn needs_generation(context: ContextTag, payload: impl Into<String>) -> Self {
        Decision::NeedsGeneration {
            context,
            payload: payload.into(),
            acknowledgment: context.acknowledgment().to_string(),
        }
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Decision::NeedsGeneration { .. })
    }
}
