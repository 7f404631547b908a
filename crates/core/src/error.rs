//! Error taxonomy and recovery strategies for StorySpark
//!
//! Failures fall into two groups:
//! - **Absorbed**: expected offline conditions (network unavailable, cache
//!   write failures). Callers degrade to stale or empty data.
//! - **Surfaced**: conditions that need user awareness or action (invalid
//!   audio reference, rejected playback, remote errors, missing login).
//!
//! No error in this core is fatal to the process; every failure is scoped to
//! a single story or playback session.

use crate::types::ReferenceError;
use std::fmt;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Serve cached data instead of the live source
    UseCache,
    /// Retry with exponential backoff
    RetryWithBackoff,
    /// Let the user retry the action (e.g. press play again)
    RetryByUser,
    /// Ask the user to sign in
    SignIn,
    /// Nothing can be done for this item
    Abandon,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseCache => write!(f, "Falling back to cached data"),
            Self::RetryWithBackoff => write!(f, "Retrying with backoff"),
            Self::RetryByUser => write!(f, "Waiting for user retry"),
            Self::SignIn => write!(f, "Sign-in required"),
            Self::Abandon => write!(f, "Giving up on this item"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Absorbed locally; the caller sees degraded data
    Recoverable,
    /// Surfaced; the current story or session is affected
    Degraded,
    /// Surfaced; the user must act before it can succeed
    UserActionRequired,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::UserActionRequired => write!(f, "UserActionRequired"),
        }
    }
}

/// Main error type for StorySpark
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Fetch-level failure: DNS, refused connection, dropped socket
    #[error("Network unavailable: {reason}")]
    NetworkUnavailable { reason: String },

    /// A remote call did not complete within its budget
    #[error("Network timeout after {seconds}s: {operation}")]
    NetworkTimeout { operation: String, seconds: u64 },

    /// Malformed or missing audio source
    #[error("Invalid audio reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// The media runtime could not load or decode the bound source
    #[error("Failed to load audio '{reference}': {reason}")]
    MediaLoadFailed { reference: String, reason: String },

    /// The media runtime refused to start playback
    #[error("Playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    /// Non-2xx response from an authenticated call
    #[error("Remote error {status}: {message}")]
    RemoteError { status: u16, message: String },

    /// Authenticated operation attempted without a token
    #[error("Not authenticated")]
    Unauthenticated,

    /// The server answered 2xx with a body we could not understand
    #[error("Invalid response: {details}")]
    InvalidResponse { details: String },

    /// A write that had to land did not
    #[error("Cache write failed for '{key}': {reason}")]
    CacheWriteFailed { key: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NetworkUnavailable { .. }
            | Self::NetworkTimeout { .. }
            | Self::CacheWriteFailed { .. } => ErrorSeverity::Recoverable,

            Self::InvalidReference { .. }
            | Self::MediaLoadFailed { .. }
            | Self::RemoteError { .. }
            | Self::InvalidResponse { .. } => ErrorSeverity::Degraded,

            Self::PlaybackRejected { .. } | Self::Unauthenticated => {
                ErrorSeverity::UserActionRequired
            }
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::NetworkUnavailable { .. } | Self::NetworkTimeout { .. } => RecoveryAction::UseCache,
            Self::CacheWriteFailed { .. } => RecoveryAction::RetryWithBackoff,
            Self::RemoteError { status, .. } if *status >= 500 => RecoveryAction::RetryWithBackoff,
            Self::PlaybackRejected { .. } | Self::MediaLoadFailed { .. } => {
                RecoveryAction::RetryByUser
            }
            Self::Unauthenticated => RecoveryAction::SignIn,
            Self::RemoteError { status: 401, .. } => RecoveryAction::SignIn,
            Self::InvalidReference { .. }
            | Self::RemoteError { .. }
            | Self::InvalidResponse { .. } => RecoveryAction::Abandon,
        }
    }

    /// Returns true for failures that mean "could not reach the server"
    pub fn is_network_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable { .. } | Self::NetworkTimeout { .. }
        )
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable { .. } | Self::NetworkTimeout { .. } => {
                "You appear to be offline. Showing saved stories.".to_string()
            }
            Self::InvalidReference { reference, .. } if reference.is_empty() => {
                "No audio URL provided".to_string()
            }
            Self::InvalidReference { reference, .. } => {
                format!("Invalid audio URL format: {}", reference)
            }
            Self::MediaLoadFailed { reference, .. } => {
                format!("Error loading audio. Please try again. ({})", reference)
            }
            Self::PlaybackRejected { reason } => {
                format!("Error playing audio: {}. Try again.", reason)
            }
            Self::RemoteError { message, .. } => message.clone(),
            Self::Unauthenticated => "Please log in to continue.".to_string(),
            Self::InvalidResponse { .. } => "Received invalid data from the server.".to_string(),
            Self::CacheWriteFailed { .. } => {
                "Could not save the story for offline use.".to_string()
            }
        }
    }
}

impl From<ReferenceError> for AppError {
    fn from(err: ReferenceError) -> Self {
        match err {
            ReferenceError::Empty => Self::InvalidReference {
                reference: String::new(),
                reason: "empty reference".to_string(),
            },
            ReferenceError::Malformed { reference, reason } => {
                Self::InvalidReference { reference, reason }
            }
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
