//! Narrator cadence

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Periods and thresholds of the expression timers, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarratorConfig {
    pub mood_interval_ms: u64,
    /// Chance that a mood tick re-derives the mood from the story text
    pub mood_change_probability: f64,
    pub speaking_interval_ms: u64,
    /// Minimum time between two speaking toggles
    pub speaking_debounce_ms: u64,
    pub blink_check_interval_ms: u64,
    /// Minimum time between two blinks
    pub blink_min_gap_ms: u64,
    pub blink_hold_ms: u64,
    /// How much of the story text mood detection looks at
    pub mood_sample_chars: usize,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            mood_interval_ms: 4000,
            mood_change_probability: 0.3,
            speaking_interval_ms: 500,
            speaking_debounce_ms: 1500,
            blink_check_interval_ms: 200,
            blink_min_gap_ms: 3000,
            blink_hold_ms: 200,
            mood_sample_chars: 500,
        }
    }
}

impl ConfigSection for NarratorConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::in_range(self.mood_interval_ms, 100, 600_000, "narrator.mood_interval_ms"),
            Validator::in_range(
                self.mood_change_probability,
                0.0,
                1.0,
                "narrator.mood_change_probability",
            ),
            Validator::in_range(
                self.speaking_interval_ms,
                50,
                60_000,
                "narrator.speaking_interval_ms",
            ),
            Validator::in_range(
                self.speaking_debounce_ms,
                0,
                60_000,
                "narrator.speaking_debounce_ms",
            ),
            Validator::in_range(
                self.blink_check_interval_ms,
                10,
                10_000,
                "narrator.blink_check_interval_ms",
            ),
            Validator::in_range(self.blink_hold_ms, 10, 5_000, "narrator.blink_hold_ms"),
            Validator::in_range(self.mood_sample_chars, 1, 100_000, "narrator.mood_sample_chars"),
        ];

        if self.blink_hold_ms >= self.blink_min_gap_ms {
            results.push(Err(ValidationError::with_value(
                "narrator.blink_min_gap_ms",
                "must be longer than blink_hold_ms",
                self.blink_min_gap_ms,
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "narrator"
    }
}
