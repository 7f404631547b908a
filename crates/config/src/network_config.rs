//! Backend endpoints and request policy

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Backend origin; also the base for root-relative audio references
    pub api_base_url: String,

    /// Public story list
    pub catalog_path: String,

    /// Authenticated list, detail (`/{id}`) and delete (`/{id}`)
    pub user_stories_path: String,

    /// Upper bound on any single remote call
    pub request_timeout_secs: u64,

    pub retry_attempts: usize,
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_backoff_multiplier: f64,

    /// Consecutive failures before requests short-circuit to the cache
    pub circuit_breaker_threshold: usize,
    pub circuit_breaker_reset_secs: u64,

    /// Successful probes needed before the breaker closes again
    pub circuit_breaker_probe_successes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            catalog_path: "/api/stories".to_string(),
            user_stories_path: "/api/user/stories".to_string(),
            request_timeout_secs: 15,
            retry_attempts: 3,
            retry_initial_delay_ms: 200,
            retry_max_delay_ms: 5_000,
            retry_backoff_multiplier: 2.0,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 30,
            circuit_breaker_probe_successes: 1,
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_initial_delay(&self) -> Duration {
        Duration::from_millis(self.retry_initial_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn circuit_breaker_reset(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }
}

impl ConfigSection for NetworkConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::http_url(&self.api_base_url, "network.api_base_url"),
            Validator::root_relative(&self.catalog_path, "network.catalog_path"),
            Validator::root_relative(&self.user_stories_path, "network.user_stories_path"),
            Validator::in_range(
                self.request_timeout_secs,
                1,
                300,
                "network.request_timeout_secs",
            ),
            Validator::in_range(self.retry_attempts, 1, 10, "network.retry_attempts"),
            Validator::in_range(
                self.retry_initial_delay_ms,
                0,
                60_000,
                "network.retry_initial_delay_ms",
            ),
            Validator::in_range(
                self.retry_max_delay_ms,
                self.retry_initial_delay_ms,
                300_000,
                "network.retry_max_delay_ms",
            ),
            Validator::in_range(
                self.retry_backoff_multiplier,
                1.0,
                10.0,
                "network.retry_backoff_multiplier",
            ),
            Validator::in_range(
                self.circuit_breaker_threshold,
                1,
                100,
                "network.circuit_breaker_threshold",
            ),
            Validator::in_range(
                self.circuit_breaker_reset_secs,
                1,
                3600,
                "network.circuit_breaker_reset_secs",
            ),
            Validator::in_range(
                self.circuit_breaker_probe_successes,
                1,
                10,
                "network.circuit_breaker_probe_successes",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "network"
    }
}
