// crates/network/src/transport.rs
//! The seam between services and the wire
//!
//! Services only ever see [`Transport`]; production wires in
//! [`crate::Client`], tests wire in an in-memory fake.

use crate::error::{NetworkError, NetworkResult};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use url::Url;

/// HTTP verbs the engine needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Delete,
}

/// A request as the services describe it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            bearer: None,
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: Method::Delete,
            url,
            bearer: None,
        }
    }

    /// Attaches an `Authorization: Bearer` token
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// A fully buffered response
///
/// Non-2xx statuses are responses, not errors; callers decide what a 404
/// or 500 means for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> NetworkResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| NetworkError::Decode(e.to_string()))
    }
}

/// Executes requests against some backend
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> NetworkResult<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> NetworkResult<HttpResponse> {
        (**self).execute(request).await
    }
}
