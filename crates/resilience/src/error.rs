// crates/resilience/src/error.rs
//! Failures raised by the resilience layer itself
//!
//! Errors of the wrapped operation pass through unchanged; only a bounded
//! call running out of time or a breaker refusing a call show up here.

use std::time::Duration;
use thiserror::Error;

pub type ResilienceResult<T> = Result<T, ResilienceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend failed repeatedly; calls are refused until a probe is due
    #[error("Circuit breaker is open after {failures} failures (next probe in {retry_in:?})")]
    CircuitBreakerOpen { failures: usize, retry_in: Duration },
}

impl ResilienceError {
    /// How long a caller should wait before the call can succeed at all
    pub fn retry_in(&self) -> Option<Duration> {
        match self {
            ResilienceError::CircuitBreakerOpen { retry_in, .. } => Some(*retry_in),
            ResilienceError::Timeout(_) => None,
        }
    }
}
