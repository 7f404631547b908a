// crates/network/src/client.rs
//! HTTP client wrapper with resilience

use crate::error::{NetworkError, NetworkResult};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use storyspark_resilience::{retry_async, CircuitBreaker, CircuitBreakerConfig, RetryPolicy};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Retry policy for transport failures and 5xx responses
    pub retry_policy: Option<RetryPolicy>,
    /// Circuit breaker config
    pub circuit_breaker_config: Option<CircuitBreakerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("StorySpark/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            retry_policy: Some(RetryPolicy::new(3).with_initial_delay(Duration::from_millis(200))),
            circuit_breaker_config: Some(CircuitBreakerConfig::new(5, Duration::from_secs(30))),
        }
    }
}

/// reqwest-backed [`Transport`] with retry and a circuit breaker
#[derive(Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
    circuit_breaker: Option<CircuitBreaker>,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        let circuit_breaker = config
            .circuit_breaker_config
            .as_ref()
            .map(|cfg| CircuitBreaker::new(cfg.clone()));

        Ok(Self {
            inner: client,
            config,
            circuit_breaker,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One attempt; a 5xx comes back as `ServerStatus` so the retry loop sees it
    async fn send_once(&self, request: &HttpRequest) -> NetworkResult<HttpResponse> {
        if let Some(cb) = &self.circuit_breaker {
            cb.can_proceed()?;
        }

        let result = self.dispatch(request).await;

        if let Some(cb) = &self.circuit_breaker {
            match &result {
                Err(e) if e.is_retryable() => cb.record_failure(),
                _ => cb.record_success(),
            }
        }

        result
    }

    async fn dispatch(&self, request: &HttpRequest) -> NetworkResult<HttpResponse> {
        let builder = match request.method {
            Method::Get => self.inner.get(request.url.clone()),
            Method::Delete => self.inner.delete(request.url.clone()),
        };
        let builder = match &request.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        log::debug!(
            "{:?} {} -> {} ({} bytes)",
            request.method,
            request.url,
            status,
            body.len()
        );

        if status >= 500 {
            Err(NetworkError::ServerStatus { status, body })
        } else {
            Ok(HttpResponse { status, body })
        }
    }

    fn classify(&self, err: reqwest::Error) -> NetworkError {
        if err.is_timeout() {
            NetworkError::Timeout(self.config.timeout)
        } else if err.is_connect() {
            NetworkError::Unreachable(err.to_string())
        } else {
            NetworkError::Http(err)
        }
    }
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: HttpRequest) -> NetworkResult<HttpResponse> {
        let policy = self
            .config
            .retry_policy
            .clone()
            .unwrap_or_else(RetryPolicy::no_retry);

        let result = retry_async(&policy, NetworkError::is_retryable, || {
            self.send_once(&request)
        })
        .await;

        match result {
            // Retries spent; hand the last 5xx back as an ordinary response
            Err(NetworkError::ServerStatus { status, body }) => {
                log::warn!("{} still failing with HTTP {}", request.url, status);
                Ok(HttpResponse { status, body })
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_redirects, 10);
        assert!(config.retry_policy.is_some());
        assert!(config.user_agent.starts_with("StorySpark/"));
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            timeout: Duration::from_secs(10),
            user_agent: "TestAgent".to_string(),
            max_redirects: 5,
            retry_policy: None,
            circuit_breaker_config: None,
        };

        let client = Client::with_config(config).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(10));
        assert!(client.circuit_breaker.is_none());
    }
}
