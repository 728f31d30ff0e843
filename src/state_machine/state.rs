//! Conversation state types

use crate::intent::Intent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// User-data key for the most recent user message
pub const LAST_USER_MESSAGE: &str = "last_user_message";
/// User-data key for the most recent logged reading value
pub const LAST_READING: &str = "last_reading";
/// User-data key for the requested reminder time
pub const REMINDER_TIME: &str = "reminder_time";

/// Where the session is in the dialogue flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Fresh session, nothing said yet
    #[default]
    Greeting,
    AwaitingSelection,
    AwaitingReading,
    AwaitingReminderTime,
    AwaitingQuestion,
    /// Steady state once any topic has been handled
    Conversation,
    /// Any step value this build does not know about
    #[serde(other)]
    Unrecognized,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Greeting => "greeting",
            Step::AwaitingSelection => "awaiting_selection",
            Step::AwaitingReading => "awaiting_reading",
            Step::AwaitingReminderTime => "awaiting_reminder_time",
            Step::AwaitingQuestion => "awaiting_question",
            Step::Conversation => "conversation",
            Step::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = Infallible;

    /// Unknown names map to [`Step::Unrecognized`] rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "greeting" => Step::Greeting,
            "awaiting_selection" => Step::AwaitingSelection,
            "awaiting_reading" => Step::AwaitingReading,
            "awaiting_reminder_time" => Step::AwaitingReminderTime,
            "awaiting_question" => Step::AwaitingQuestion,
            "conversation" => Step::Conversation,
            _ => Step::Unrecognized,
        })
    }
}

/// Topic label carried in the state and echoed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    #[default]
    General,
    Nutrition,
    Exercise,
    EmotionalSupport,
    LoggedReading,
    ClarificationNeeded,
    Question,
    Reminder,
}

impl ContextTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextTag::General => "general",
            ContextTag::Nutrition => "nutrition",
            ContextTag::Exercise => "exercise",
            ContextTag::EmotionalSupport => "emotional_support",
            ContextTag::LoggedReading => "logged_reading",
            ContextTag::ClarificationNeeded => "clarification_needed",
            ContextTag::Question => "question",
            ContextTag::Reminder => "reminder",
        }
    }

    /// Short scripted line that precedes a generated reply
    pub fn acknowledgment(self) -> &'static str {
        match self {
            ContextTag::Nutrition => "Let's talk about food and meals.",
            ContextTag::Exercise => "Staying active is a great topic.",
            ContextTag::EmotionalSupport => {
                "Thank you for sharing how you feel. You're not alone in this."
            }
            ContextTag::Question => {
                "Thanks for your question. Let me get you some helpful information."
            }
            ContextTag::General
            | ContextTag::LoggedReading
            | ContextTag::ClarificationNeeded
            | ContextTag::Reminder => "Let me help with that.",
        }
    }
}

impl From<Intent> for ContextTag {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::LogReading => ContextTag::LoggedReading,
            Intent::Nutrition => ContextTag::Nutrition,
            Intent::Exercise => ContextTag::Exercise,
            Intent::EmotionalSupport => ContextTag::EmotionalSupport,
            Intent::General => ContextTag::General,
        }
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session dialogue state, mutated only by the transition function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: Step,
    pub context: ContextTag,
    /// Whether the last valid reading was low or high
    pub last_urgent: bool,
    /// Prior answers carried forward between turns
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bare number should be treated as a reading in this step
    pub fn expects_reading(&self) -> bool {
        self.step == Step::AwaitingReading
    }

    #[cfg(test)]
    pub fn last_user_message(&self) -> Option<&str> {
        self.data.get(LAST_USER_MESSAGE).map(String::as_str)
    }
}
