//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Playback and waveform preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0.0 - 1.0)
    pub default_volume: f64,

    /// Seconds moved by the skip buttons
    pub skip_seconds: f64,

    /// Number of bars in the synthetic waveform
    pub waveform_bars: usize,

    /// Drawing width the waveform is laid out in
    pub waveform_width: f64,

    /// Gap between bars, same units as the width
    pub waveform_gap: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: 0.8,
            skip_seconds: 10.0,
            waveform_bars: 100,
            waveform_width: 300.0,
            waveform_gap: 1.0,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::in_range(self.default_volume, 0.0, 1.0, "player.default_volume"),
            Validator::in_range(self.skip_seconds, 1.0, 300.0, "player.skip_seconds"),
            Validator::in_range(self.waveform_bars, 1, 1000, "player.waveform_bars"),
            Validator::in_range(self.waveform_width, 1.0, 10_000.0, "player.waveform_width"),
            Validator::in_range(self.waveform_gap, 0.0, 100.0, "player.waveform_gap"),
        ];

        // Bars must keep a positive width after the gap is taken out
        if self.waveform_bars > 0
            && self.waveform_width / self.waveform_bars as f64 <= self.waveform_gap
        {
            results.push(Err(ValidationError::new(
                "player.waveform_gap",
                "leaves no room for bars at this width",
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.default_volume = other.default_volume;
        self.skip_seconds = other.skip_seconds;
        self.waveform_bars = other.waveform_bars;
        self.waveform_width = other.waveform_width;
        self.waveform_gap = other.waveform_gap;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
