//! Wires the library services from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use storyspark_config::{Config, ConfigManager, NetworkConfig};
use storyspark_library::StoryCatalogService;
use storyspark_network::{Client, ClientConfig, StaticToken, TokenProvider, Transport};
use storyspark_resilience::{CircuitBreakerConfig, RetryPolicy};

/// HTTP client settings derived from the `network` section
pub fn client_config(network: &NetworkConfig) -> ClientConfig {
    ClientConfig {
        timeout: network.request_timeout(),
        retry_policy: Some(
            RetryPolicy::new(network.retry_attempts)
                .with_initial_delay(network.retry_initial_delay())
                .with_max_delay(network.retry_max_delay())
                .with_multiplier(network.retry_backoff_multiplier),
        ),
        circuit_breaker_config: Some(
            CircuitBreakerConfig::new(network.circuit_breaker_threshold, network.circuit_breaker_reset())
                .with_success_threshold(network.circuit_breaker_probe_successes),
        ),
        ..ClientConfig::default()
    }
}

pub fn build_catalog(config: &Config, token: Option<&str>) -> Result<StoryCatalogService> {
    let cache_dir = ConfigManager::resolve_cache_dir(config).context("Failed to resolve cache directory")?;
    log::debug!("Using cache directory {}", cache_dir.display());

    let (cache, blobs) = storyspark_cache::open_dir(&cache_dir)
        .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?;

    let client = Client::with_config(client_config(&config.network)).context("Failed to create HTTP client")?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    let tokens: Arc<dyn TokenProvider> = Arc::new(match token {
        Some(token) => StaticToken::new(token),
        None => StaticToken::none(),
    });

    storyspark_library::build_services(&config.network, transport, cache, blobs, tokens)
        .context("Invalid network configuration")
}
