//! Bounded calls through the transport seam

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use storyspark_core::{AppError, Result};
use storyspark_network::{HttpRequest, HttpResponse, Transport};
use storyspark_resilience::with_timeout;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A transport plus the time budget every call through it gets
#[derive(Clone)]
pub(crate) struct Remote {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Remote {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executes `request`; a call that outlives the budget is a
    /// `NetworkTimeout`, whatever the transport itself does
    pub(crate) async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let target = request.url.to_string();
        match with_timeout(self.timeout, self.transport.execute(request)).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::NetworkTimeout {
                operation: target,
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

/// Turns a non-2xx response into `RemoteError`, keeping the server's
/// `{ message }` verbatim when there is one
pub(crate) fn remote_error(response: &HttpResponse) -> AppError {
    let message = response
        .json::<ErrorEnvelope>()
        .ok()
        .and_then(|e| e.message.or(e.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", response.status));

    AppError::RemoteError {
        status: response.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_uses_envelope_message() {
        let response = HttpResponse::new(404, r#"{"message":"Story not found"}"#);
        assert_eq!(
            remote_error(&response),
            AppError::RemoteError {
                status: 404,
                message: "Story not found".to_string()
            }
        );
    }

    #[test]
    fn test_remote_error_accepts_error_key() {
        let response = HttpResponse::new(401, r#"{"error":"Token expired"}"#);
        assert_eq!(remote_error(&response).user_message(), "Token expired");
    }

    #[test]
    fn test_remote_error_without_envelope() {
        let response = HttpResponse::new(502, "<html>Bad Gateway</html>");
        assert_eq!(
            remote_error(&response).user_message(),
            "Request failed with status 502"
        );
    }
}
