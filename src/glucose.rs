//! Blood glucose reading validation
//!
//! Extracts the first run of digits from free text and classifies it
//! against the fixed mg/dL bands. Validation never fails: every input
//! produces a [`ReadingOutcome`].

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Lowest loggable value in mg/dL
pub const MIN_READING: u32 = 20;
/// Highest loggable value in mg/dL
pub const MAX_READING: u32 = 600;

/// Lower bound of the target range (inclusive)
pub const TARGET_LOW: u32 = 70;
/// Upper bound of the target range (inclusive)
pub const TARGET_HIGH: u32 = 180;
/// Upper bound of the elevated band (inclusive)
const ELEVATED_HIGH: u32 = 250;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Qualitative band of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Band {
    Low,
    InRange,
    Elevated,
    High,
}

impl Band {
    /// Classify a value that is already known to be within bounds
    pub fn classify(value: u32) -> Self {
        match value {
            v if v < TARGET_LOW => Band::Low,
            v if v <= TARGET_HIGH => Band::InRange,
            v if v <= ELEVATED_HIGH => Band::Elevated,
            _ => Band::High,
        }
    }

    /// Low and high readings need medical attention
    pub fn is_urgent(self) -> bool {
        matches!(self, Band::Low | Band::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::InRange => "in-range",
            Band::Elevated => "elevated",
            Band::High => "high",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated glucose measurement. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub value: u32,
    pub band: Band,
    pub urgent: bool,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Build a reading stamped with the current time.
    ///
    /// Callers are expected to go through [`validate`]; the value is not
    /// re-checked against the loggable bounds here.
    pub fn new(value: u32) -> Self {
        Self::at(value, Utc::now())
    }

    pub fn at(value: u32, timestamp: DateTime<Utc>) -> Self {
        let band = Band::classify(value);
        Self {
            value,
            band,
            urgent: band.is_urgent(),
            timestamp,
        }
    }

    /// Scripted feedback for this reading
    pub fn feedback(&self) -> String {
        let v = self.value;
        match self.band {
            Band::Low => format!(
                "⚠️ Your reading of {v} mg/dL is low. Please treat it right away with fast-acting carbs \
                 (like juice or glucose tablets) and recheck in 15 minutes. \
                 Contact your healthcare provider if it stays low."
            ),
            Band::InRange => {
                format!("Great! Your reading of {v} mg/dL is within your target range.")
            }
            Band::Elevated => format!(
                "Your reading of {v} mg/dL is a bit elevated. Staying hydrated and a short walk may help."
            ),
            Band::High => format!(
                "⚠️ Your reading of {v} mg/dL is high. If you feel unwell or it stays high, \
                 please contact your healthcare provider."
            ),
        }
    }
}

/// Result of validating free text as a reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingOutcome {
    Valid(Reading),
    /// No digits at all in the text
    ClarificationNeeded { reason: String },
    /// Digits found but the number is outside the loggable bounds
    OutOfRange { raw: String },
}

impl ReadingOutcome {
    /// Message to show the user when the outcome is not a valid reading
    pub fn reprompt(&self) -> Option<String> {
        match self {
            ReadingOutcome::Valid(_) => None,
            ReadingOutcome::ClarificationNeeded { reason } => Some(format!(
                "{reason} Please enter your blood sugar reading in mg/dL (for example, 120)."
            )),
            ReadingOutcome::OutOfRange { raw } => Some(format!(
                "{raw} mg/dL is outside the range I can log ({MIN_READING}-{MAX_READING}). \
                 Please double-check your meter and enter the reading again."
            )),
        }
    }
}

/// First maximal run of ASCII digits in the text, if any
pub fn first_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|m| m.as_str())
}

/// Whether the text contains any digit run
pub fn has_digit_run(text: &str) -> bool {
    DIGIT_RUN.is_match(text)
}

/// Validate free text as a glucose reading.
pub fn validate(text: &str) -> ReadingOutcome {
    let Some(raw) = first_digit_run(text) else {
        return ReadingOutcome::ClarificationNeeded {
            reason: "I couldn't find a number in your message.".to_string(),
        };
    };

    // Runs too long for u32 are out of range by definition
    match raw.parse::<u32>() {
        Ok(value) if (MIN_READING..=MAX_READING).contains(&value) => {
            ReadingOutcome::Valid(Reading::new(value))
        }
        _ => ReadingOutcome::OutOfRange {
            raw: raw.to_string(),
        },
    }
}
