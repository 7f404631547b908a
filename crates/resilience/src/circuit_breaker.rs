// crates/resilience/src/circuit_breaker.rs
//! Circuit breaker for a flaky backend
//!
//! After `failure_threshold` consecutive failures the breaker opens and
//! callers fail fast (and so fall back to cache) instead of waiting on a
//! server that is down. After `reset_after` one probe is let through.

use crate::error::{ResilienceError, ResilienceResult};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally
    Closed,
    /// Requests are rejected
    Open,
    /// Probing whether the backend recovered
    HalfOpen,
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    failure_threshold: usize,
    reset_after: Duration,
    success_threshold: usize,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration
    pub fn new(failure_threshold: usize, reset_after: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_after,
            success_threshold: 1,
        }
    }

    /// Sets how many half-open successes close the circuit
    pub fn with_success_threshold(mut self, threshold: usize) -> Self {
        self.success_threshold = threshold.max(1);
        self
    }

    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    pub fn reset_after(&self) -> Duration {
        self.reset_after
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: usize,
    success_count: usize,
    last_failure: Option<Instant>,
}

/// Shared circuit breaker; clones observe the same state
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Arc<Mutex<BreakerState>>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure: None,
            })),
        }
    }

    /// Gets the current state
    pub fn state(&self) -> CircuitState {
        self.state.lock().map(|s| s.state).unwrap_or(CircuitState::Open)
    }

    /// Records a successful operation
    pub fn record_success(&self) {
        if let Ok(mut s) = self.state.lock() {
            match s.state {
                CircuitState::HalfOpen => {
                    s.success_count += 1;
                    if s.success_count >= self.config.success_threshold {
                        log::info!("Circuit breaker closed after successful probe");
                        s.state = CircuitState::Closed;
                        s.failure_count = 0;
                        s.success_count = 0;
                    }
                }
                CircuitState::Closed => s.failure_count = 0,
                CircuitState::Open => {}
            }
        }
    }

    /// Records a failed operation
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    fn record_failure_at(&self, now: Instant) {
        if let Ok(mut s) = self.state.lock() {
            s.failure_count += 1;
            s.success_count = 0;
            s.last_failure = Some(now);

            let should_open = s.state == CircuitState::HalfOpen
                || s.failure_count >= self.config.failure_threshold;
            if should_open && s.state != CircuitState::Open {
                log::warn!(
                    "Circuit breaker opened after {} consecutive failures",
                    s.failure_count
                );
                s.state = CircuitState::Open;
            }
        }
    }

    /// Checks if a request can proceed
    pub fn can_proceed(&self) -> ResilienceResult<()> {
        self.can_proceed_at(Instant::now())
    }

    fn can_proceed_at(&self, now: Instant) -> ResilienceResult<()> {
        let Ok(mut s) = self.state.lock() else {
            // A poisoned breaker must not block every request forever
            return Ok(());
        };

        if s.state != CircuitState::Open {
            return Ok(());
        }

        let since_failure = s
            .last_failure
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO);

        if since_failure >= self.config.reset_after {
            log::debug!("Circuit breaker half-open, letting a probe through");
            s.state = CircuitState::HalfOpen;
            s.success_count = 0;
            Ok(())
        } else {
            Err(ResilienceError::CircuitBreakerOpen {
                failures: s.failure_count,
                retry_in: self.config.reset_after - since_failure,
            })
        }
    }

    /// Resets the circuit breaker to closed state
    pub fn reset(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.state = CircuitState::Closed;
            s.failure_count = 0;
            s.success_count = 0;
            s.last_failure = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_breaker_initial_state() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.can_proceed().is_ok());
    }

    #[test]
    fn test_circuit_opens_after_threshold() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(3, Duration::from_secs(1)));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(matches!(
            cb.can_proceed(),
            Err(ResilienceError::CircuitBreakerOpen { failures: 3, .. })
        ));
    }

    #[test]
    fn test_open_breaker_reports_time_to_probe() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(1, Duration::from_secs(30)));
        let failed_at = Instant::now();
        cb.record_failure_at(failed_at);

        let err = cb
            .can_proceed_at(failed_at + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(err.retry_in(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(2, Duration::from_secs(1)));
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_reset_window() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(1, Duration::from_secs(30)));
        let t0 = Instant::now();
        cb.record_failure_at(t0);

        assert!(cb.can_proceed_at(t0 + Duration::from_secs(10)).is_err());
        assert!(cb.can_proceed_at(t0 + Duration::from_secs(30)).is_ok());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_probe_failure_reopens() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(3, Duration::from_secs(5)));
        let t0 = Instant::now();
        for _ in 0..3 {
            cb.record_failure_at(t0);
        }
        assert!(cb.can_proceed_at(t0 + Duration::from_secs(5)).is_ok());

        cb.record_failure_at(t0 + Duration::from_secs(6));
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_probe_success_closes() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new(1, Duration::ZERO).with_success_threshold(2),
        );
        cb.record_failure();
        assert!(cb.can_proceed().is_ok());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_clones_share_state() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new(1, Duration::from_secs(60)));
        let clone = cb.clone();
        clone.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        assert_eq!(clone.state(), CircuitState::Closed);
    }
}
