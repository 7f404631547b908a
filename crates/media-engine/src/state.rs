//! Playback phases and the observable player state

use std::fmt;
use storyspark_core::AppError;

/// One discrete state of the player
///
/// `Idle` holds before the first load and after disposal. `Ended` and
/// `Error` are terminal until the next load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Error)
    }

    /// Whether a bound source has reported its metadata
    pub fn has_metadata(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub current_time: f64,
    /// Zero until the source reports metadata
    pub duration: f64,
    pub volume: f64,
    pub error: Option<AppError>,
}

impl PlaybackState {
    pub fn new(volume: f64) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current_time: 0.0,
            duration: 0.0,
            volume,
            error: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn progress_percentage(&self) -> f64 {
        crate::waveform::progress_fraction(self.current_time, self.duration) * 100.0
    }

    pub(crate) fn reset_for_load(&mut self) {
        self.phase = PlaybackPhase::Loading;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: AppError) {
        self.phase = PlaybackPhase::Error;
        self.error = Some(error);
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}
