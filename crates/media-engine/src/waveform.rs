//! Synthetic waveform and its played/unplayed split

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of bars drawn by default
pub const DEFAULT_BARS: usize = 100;

const START: f64 = 0.5;
const STEP: f64 = 0.1;
const MIN_AMPLITUDE: f64 = 0.1;
const MAX_AMPLITUDE: f64 = 0.9;

/// Produces the amplitude sequence drawn for a loaded source
pub trait AmplitudeSource: Send {
    fn generate(&mut self, length: usize) -> Vec<f64>;
}

/// Bounded random walk standing in for real sample analysis
///
/// Starts at 0.5 and moves at most 0.1 per bar, clamped to `[0.1, 0.9]`.
#[derive(Debug)]
pub struct SyntheticAmplitudes<R = StdRng> {
    rng: R,
}

impl SyntheticAmplitudes<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SyntheticAmplitudes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for SyntheticAmplitudes<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng + Send> AmplitudeSource for SyntheticAmplitudes<R> {
    fn generate(&mut self, length: usize) -> Vec<f64> {
        let mut samples = Vec::with_capacity(length);
        let mut previous = START;
        for _ in 0..length {
            let next = (previous + self.rng.gen_range(-STEP..=STEP))
                .clamp(MIN_AMPLITUDE, MAX_AMPLITUDE);
            samples.push(next);
            previous = next;
        }
        samples
    }
}

/// How much of the waveform counts as played
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaveformSplit {
    pub played_count: usize,
    pub progress_fraction: f64,
}

/// Playback progress as a fraction in `[0, 1]`; zero while duration is unknown
pub fn progress_fraction(current_time: f64, duration: f64) -> f64 {
    if !(duration > 0.0) || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}

/// Counts the bars left of the playhead
///
/// Bars are laid out uniformly across `total_width`, so bar `i` starts at
/// `i * total_width / len` whatever the gap between bars. A bar is played
/// when it starts strictly before `progress * total_width`.
pub fn render_split(
    samples: &[f64],
    current_time: f64,
    duration: f64,
    total_width: f64,
) -> WaveformSplit {
    let progress = progress_fraction(current_time, duration);
    if samples.is_empty() || !(total_width > 0.0) {
        return WaveformSplit {
            played_count: 0,
            progress_fraction: progress,
        };
    }

    let playhead = progress * total_width;
    let pitch = total_width / samples.len() as f64;
    let played_count = (0..samples.len())
        .take_while(|&i| (i as f64) * pitch < playhead)
        .count();

    WaveformSplit {
        played_count,
        progress_fraction: progress,
    }
}

/// Bar geometry for drawing a waveform into a fixed width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformLayout {
    pub width: f64,
    pub gap: f64,
}

impl WaveformLayout {
    pub fn new(width: f64, gap: f64) -> Self {
        Self { width, gap }
    }

    pub fn bar_width(&self, bars: usize) -> f64 {
        if bars == 0 {
            return 0.0;
        }
        (self.width / bars as f64 - self.gap).max(0.0)
    }

    pub fn bar_x(&self, index: usize, bars: usize) -> f64 {
        index as f64 * (self.bar_width(bars) + self.gap)
    }

    /// Converts a click at `x` into a seek fraction
    pub fn fraction_at(&self, x: f64) -> f64 {
        if !(self.width > 0.0) || !x.is_finite() {
            return 0.0;
        }
        (x / self.width).clamp(0.0, 1.0)
    }
}

impl Default for WaveformLayout {
    fn default() -> Self {
        Self::new(300.0, 1.0)
    }
}
