// crates/network/src/lib.rs
//! Network layer for StorySpark
//!
//! A small [`Transport`] trait that services depend on, and a reqwest-backed
//! [`Client`] implementing it with retry and a circuit breaker.

mod auth;
mod client;
mod error;
mod transport;

pub use auth::{StaticToken, TokenProvider};
pub use client::{Client, ClientConfig};
pub use error::{NetworkError, NetworkResult};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
