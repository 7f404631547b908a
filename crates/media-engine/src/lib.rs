//! Media Engine - playback control for StorySpark
//!
//! [`PlaybackController`] runs the Loading/Ready/Playing/Paused/Ended/Error
//! state machine on top of a [`MediaBackend`], derives a synthetic waveform
//! once per load and keeps its played/unplayed split current.

mod backend;
mod controller;
mod error;
mod simulated;
mod state;
mod time;
pub mod waveform;

pub use backend::{EventSink, MediaBackend, MediaEvent, SessionEvent, SessionId};
pub use controller::{ListenerId, PlaybackActivity, PlaybackController, PlaybackNotification};
pub use error::{EngineError, EngineResult};
pub use simulated::{SimulatedBackend, SimulatedHandle};
pub use state::{PlaybackPhase, PlaybackState};
pub use time::format_time;
pub use waveform::{render_split, AmplitudeSource, SyntheticAmplitudes, WaveformLayout, WaveformSplit};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _ = PlaybackPhase::Idle;
        let _ = WaveformSplit::default();
        let _ = format_time(1.0);
    }

    #[test]
    fn test_error_display() {
        let error = EngineError::Rejected("autoplay blocked".to_string());
        assert!(format!("{}", error).contains("autoplay"));
    }
}
