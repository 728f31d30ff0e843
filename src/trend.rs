//! Bounded per-session reading history and trend feedback

use crate::glucose::{Reading, TARGET_HIGH, TARGET_LOW};
use serde::Serialize;
use std::collections::VecDeque;

/// Maximum number of readings kept per session (oldest evicted first)
pub const HISTORY_CAPACITY: usize = 30;

/// Number of most recent readings the trend and stats look at
pub const TREND_WINDOW: usize = 7;

const HIGH_AVERAGE: f64 = 180.0;
const GOOD_CONTROL_AVERAGE: f64 = 100.0;
const VARIABILITY_SPREAD: u32 = 100;

/// FIFO-bounded history of validated readings, oldest first
#[derive(Debug, Clone, Default)]
pub struct ReadingHistory {
    readings: VecDeque<Reading>,
}

impl ReadingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading and summarize the updated history.
    pub fn record(&mut self, reading: Reading) -> String {
        if self.len() == HISTORY_CAPACITY {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
        tracing::debug!(len = self.readings.len(), "Reading appended to history");
        self.summary()
    }

    /// Qualitative trend over the most recent readings
    pub fn summary(&self) -> String {
        let len = self.readings.len();
        if len < 2 {
            return "This is your first logged reading. Log a few more over the next days \
                    and I'll start spotting trends for you."
                .to_string();
        }
        if len < TREND_WINDOW {
            return format!(
                "Keep tracking! You've logged {len} readings. After {TREND_WINDOW} I can show you trends."
            );
        }

        let window = self.recent(TREND_WINDOW);
        let mean = mean(&window);
        let spread = spread(&window);

        let mut notes = Vec::new();
        if mean > HIGH_AVERAGE {
            notes.push(format!(
                "Your average over the last {TREND_WINDOW} readings is {mean:.0} mg/dL, which is running high. \
                 It may be worth discussing with your healthcare provider."
            ));
        } else if mean < GOOD_CONTROL_AVERAGE {
            notes.push(format!(
                "Your average over the last {TREND_WINDOW} readings is {mean:.0} mg/dL. That shows good control!"
            ));
        }
        if spread > VARIABILITY_SPREAD {
            notes.push(format!(
                "Your recent readings have varied by {spread} mg/dL. Regular meals and routines can help \
                 smooth out the swings."
            ));
        }

        if notes.is_empty() {
            "Your recent readings look steady. Keep up the good work!".to_string()
        } else {
            notes.join(" ")
        }
    }

    /// The most recent `n` readings in chronological order
    pub fn recent(&self, n: usize) -> Vec<Reading> {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Aggregate statistics, `None` when nothing has been logged
    pub fn stats(&self) -> Option<ReadingStats> {
        if self.is_empty() {
            return None;
        }
        let all: Vec<Reading> = self.iter().cloned().collect();
        let average = (mean(&all) * 10.0).round() / 10.0;
        Some(ReadingStats {
            total_readings: all.len(),
            average,
            highest: all.iter().map(|r| r.value).max().unwrap_or_default(),
            lowest: all.iter().map(|r| r.value).min().unwrap_or_default(),
            in_range: all
                .iter()
                .filter(|r| (TARGET_LOW..=TARGET_HIGH).contains(&r.value))
                .count(),
            recent_readings: self.recent(TREND_WINDOW),
        })
    }
}

/// Aggregate view of a session's readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStats {
    pub total_readings: usize,
    /// Mean in mg/dL rounded to one decimal
    pub average: f64,
    pub highest: u32,
    pub lowest: u32,
    /// Readings within the target range, inclusive
    pub in_range: usize,
    /// Last readings, chronological
    pub recent_readings: Vec<Reading>,
}

fn mean(readings: &[Reading]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    let sum: f64 = readings.iter().map(|r| f64::from(r.value)).sum();
    let count = u32::try_from(readings.len()).map_or(f64::from(u32::MAX), f64::from);
    sum / count
}

fn spread(readings: &[Reading]) -> u32 {
    let max = readings.iter().map(|r| r.value).max().unwrap_or_default();
    let min = readings.iter().map(|r| r.value).min().unwrap_or_default();
    max - min
}
