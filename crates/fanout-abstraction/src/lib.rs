//! Remote-client abstraction layer for Fanout.
//!
//! This crate defines the seam between the batch pipeline and whatever backend
//! actually answers each request: the [`RemoteClient`] trait, the [`Endpoint`]
//! address type, and the error type shared by client implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when calling a remote backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// An error occurred during the request itself (network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The backend answered, but with an error (invalid input, rate limiting).
    #[error("Response Error: {0}")]
    ResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// Other unexpected errors.
    #[error("Other Client Error: {0}")]
    Other(String),
}

/// One remote backend address.
///
/// Each pipeline worker is bound to exactly one `Endpoint` for its lifetime;
/// the list of configured endpoints therefore defines the worker count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Human-readable name, used in logs and failure records.
    pub name: String,
    /// Base URL of the backend.
    pub url: String,
}

impl Endpoint {
    /// Creates a new endpoint.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// A client that turns one item payload into one output string.
///
/// All clients must be `Send + Sync` so a single instance can be shared by
/// every worker in the pool; the endpoint to call is passed per invocation.
///
/// The pipeline's per-item accounting assumes one output per call. Clients
/// that can fail for ordinary reasons (timeouts, rate limits) should either
/// retry internally or be wrapped in [`Failsafe`], which encodes the failure
/// into the output string instead of surfacing it.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Sends one item payload to the given endpoint and returns the output.
    ///
    /// # Errors
    /// Returns a `ClientError` if the call fails.
    async fn call(&self, endpoint: &Endpoint, payload: &str) -> Result<String, ClientError>;
}

/// A client that echoes every payload back unchanged.
///
/// Useful for wiring tests and for measuring pipeline overhead without a
/// live backend.
#[derive(Debug, Clone, Default)]
pub struct EchoClient;

#[async_trait]
impl RemoteClient for EchoClient {
    async fn call(&self, _endpoint: &Endpoint, payload: &str) -> Result<String, ClientError> {
        Ok(payload.to_string())
    }
}

/// Wraps a client so that it never fails.
///
/// Any `ClientError` from the inner client is rendered as an error-marker
/// output string of the form `<error: ...>`, preserving the one-output-per-item
/// contract the worker pool relies on. Retrying is left to the inner client.
#[derive(Debug, Clone)]
pub struct Failsafe<C> {
    inner: C,
}

impl<C> Failsafe<C> {
    /// Wraps the given client.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns a reference to the wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: RemoteClient> RemoteClient for Failsafe<C> {
    async fn call(&self, endpoint: &Endpoint, payload: &str) -> Result<String, ClientError> {
        match self.inner.call(endpoint, payload).await {
            Ok(output) => Ok(output),
            Err(e) => Ok(format!("<error: {}>", e)),
        }
    }
}
