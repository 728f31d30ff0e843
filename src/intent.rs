//! Keyword-based intent classification
//!
//! First match wins, in a fixed priority order. A message carrying a
//! number is treated as a reading before any topical keyword is checked.

use crate::glucose::has_digit_run;
use crate::state_machine::ConversationState;
use serde::{Deserialize, Serialize};
use std::fmt;

const GLUCOSE_KEYWORDS: &[&str] = &[
    "glucose", "sugar", "reading", "mg/dl", "blood", "level", "meter", "bg ",
];

const NUTRITION_KEYWORDS: &[&str] = &[
    "food",
    "meal",
    "diet",
    "carb",
    "snack",
    "breakfast",
    "lunch",
    "dinner",
    "nutrition",
    "recipe",
    "fruit",
    "drink",
];

const EXERCISE_KEYWORDS: &[&str] = &[
    "exercise", "workout", "walk", "run", "gym", "activity", "sport", "yoga", "fitness", "swim",
];

const EMOTIONAL_KEYWORDS: &[&str] = &[
    "stress",
    "anxious",
    "anxiety",
    "worried",
    "worry",
    "sad",
    "depress",
    "overwhelm",
    "frustrat",
    "scared",
    "afraid",
    "lonely",
    "feel",
    "upset",
];

/// Topical purpose of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LogReading,
    Nutrition,
    Exercise,
    EmotionalSupport,
    General,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::LogReading => "log_reading",
            Intent::Nutrition => "nutrition",
            Intent::Exercise => "exercise",
            Intent::EmotionalSupport => "emotional_support",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topical lists checked after the reading rule, in priority order
const TOPICS: &[(Intent, &[&str])] = &[
    (Intent::Nutrition, NUTRITION_KEYWORDS),
    (Intent::Exercise, EXERCISE_KEYWORDS),
    (Intent::EmotionalSupport, EMOTIONAL_KEYWORDS),
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Classify a message given the conversation it arrives in.
pub fn classify(text: &str, state: &ConversationState) -> Intent {
    let lowered = text.to_lowercase();

    if has_digit_run(&lowered)
        && (contains_any(&lowered, GLUCOSE_KEYWORDS) || state.expects_reading())
    {
        return Intent::LogReading;
    }

    TOPICS
        .iter()
        .find(|(_, keywords)| contains_any(&lowered, keywords))
        .map_or(Intent::General, |(intent, _)| *intent)
}
