// crates/resilience/src/timeout.rs
//! Timeout bounding for async operations
//!
//! Catalog and download fetches have no natural upper bound; wrapping them
//! here turns a hung call into a `ResilienceError::Timeout`.

use crate::error::{ResilienceError, ResilienceResult};
use std::future::Future;
use std::time::Duration;

/// Runs `operation`, failing with `Timeout` if it has not finished in `duration`
pub async fn with_timeout<F, T>(duration: Duration, operation: F) -> ResilienceResult<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| ResilienceError::Timeout(duration))
}
