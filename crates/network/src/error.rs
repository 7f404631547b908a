// crates/network/src/error.rs
//! Error types for network operations

use bytes::Bytes;
use std::time::Duration;
use storyspark_core::AppError;
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request error not covered by a more specific variant
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server could not be reached at all
    #[error("Network is unavailable: {0}")]
    Unreachable(String),

    /// The request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// 5xx response; kept as an error only so it can be retried
    #[error("Server error: HTTP {status}")]
    ServerStatus { status: u16, body: Bytes },

    /// Body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Resilience layer rejected or bounded the call
    #[error("Resilience error: {0}")]
    Resilience(#[from] storyspark_resilience::ResilienceError),
}

impl NetworkError {
    /// Returns true if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Unreachable(_)
            | NetworkError::Timeout(_)
            | NetworkError::ServerStatus { .. } => true,
            NetworkError::Http(e) => !e.is_builder() && !e.is_decode(),
            _ => false,
        }
    }
}

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        use storyspark_resilience::ResilienceError;

        match err {
            NetworkError::Timeout(after)
            | NetworkError::Resilience(ResilienceError::Timeout(after)) => AppError::NetworkTimeout {
                operation: "request".to_string(),
                seconds: after.as_secs(),
            },
            NetworkError::Http(e) if e.is_timeout() => AppError::NetworkTimeout {
                operation: e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "request".to_string()),
                seconds: 0,
            },
            NetworkError::InvalidUrl(reference) => AppError::InvalidReference {
                reference,
                reason: "cannot be requested".to_string(),
            },
            NetworkError::ServerStatus { status, .. } => AppError::RemoteError {
                status,
                message: format!("Server error (HTTP {})", status),
            },
            NetworkError::Decode(details) => AppError::InvalidResponse { details },
            other => AppError::NetworkUnavailable {
                reason: other.to_string(),
            },
        }
    }
}
