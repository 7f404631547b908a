// FILE: crates/media-engine/src/error.rs

use storyspark_core::AppError;
use thiserror::Error;

/// Failures reported by a [`MediaBackend`](crate::MediaBackend)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Source could not be bound: {0}")]
    BindFailed(String),

    #[error("Playback refused: {0}")]
    Rejected(String),

    #[error("No source bound")]
    NoSource,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Maps a backend failure onto the shared taxonomy for the given source
    pub fn into_app_error(self, reference: &str) -> AppError {
        match self {
            Self::Rejected(reason) => AppError::PlaybackRejected { reason },
            Self::NoSource => AppError::PlaybackRejected {
                reason: self.to_string(),
            },
            Self::BindFailed(reason) | Self::Backend(reason) => AppError::MediaLoadFailed {
                reference: reference.to_string(),
                reason,
            },
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_maps_to_playback_rejected() {
        let err = EngineError::Rejected("autoplay blocked".to_string()).into_app_error("/a.mp3");
        assert_eq!(
            err,
            AppError::PlaybackRejected {
                reason: "autoplay blocked".to_string()
            }
        );
    }

    #[test]
    fn test_bind_failure_keeps_reference() {
        let err = EngineError::BindFailed("unsupported codec".to_string()).into_app_error("/a.ogg");
        assert!(matches!(err, AppError::MediaLoadFailed { ref reference, .. } if reference == "/a.ogg"));
    }
}
