// crates/resilience/src/lib.rs
//! Failure policies for StorySpark's remote calls
//!
//! The catalog and download paths must give up quickly and fall back to
//! the offline cache, so every call is bounded ([`with_timeout`]), retried
//! a few times on transient failures ([`retry_async`]) and short-circuited
//! while the backend is known to be down ([`CircuitBreaker`]).
//!
//! ```rust
//! use std::time::Duration;
//! use storyspark_resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
//!
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig::new(2, Duration::from_secs(30)));
//! breaker.record_failure();
//! breaker.record_failure();
//!
//! assert_eq!(breaker.state(), CircuitState::Open);
//! assert!(breaker.can_proceed().is_err());
//! ```

mod circuit_breaker;
mod error;
mod retry;
mod timeout;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::{ResilienceError, ResilienceResult};
pub use retry::{retry_async, RetryPolicy};
pub use timeout::with_timeout;
