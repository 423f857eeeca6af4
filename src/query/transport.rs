//! Real-time database transport.
//!
//! The deployment exposes `POST /api/query` and `POST /api/mutation`, both
//! taking `{"path", "args", "format": "json"}` and answering with a
//! `status`-tagged envelope.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("database endpoint is not configured")]
    Unconfigured,
    #[error("database http client build failed: {0}")]
    ClientBuild(String),
    #[error("database request failed: {0}")]
    Request(String),
    #[error("database returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("database function error: {0}")]
    Function(String),
    #[error("database response invalid: {0}")]
    InvalidResponse(String),
}

/// Query/mutation transport. Enables mocking in tests.
#[async_trait::async_trait]
pub trait QueryTransport: Send + Sync {
    /// Run a read-only query function.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the call fails or the function throws.
    async fn query(&self, function: &str, args: &Value) -> Result<Value, TransportError>;

    /// Run a mutation function.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the call fails or the function throws.
    async fn mutation(&self, function: &str, args: &Value) -> Result<Value, TransportError>;
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success {
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

/// HTTP transport bound to one deployment URL.
///
/// An empty endpoint is accepted at construction; every call then fails with
/// [`TransportError::Unconfigured`].
pub struct ConvexHttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl ConvexHttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_timeouts(
            endpoint,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
        )
    }

    /// Bound every call so a stalled deployment surfaces as
    /// [`TransportError::Request`] instead of pinning in-flight waiters.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
    pub fn with_timeouts(endpoint: &str, request: Duration, connect: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request)
            .connect_timeout(connect)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: endpoint.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, kind: &str, function: &str, args: &Value) -> Result<Value, TransportError> {
        if self.endpoint.is_empty() {
            return Err(TransportError::Unconfigured);
        }

        let resp = self
            .http
            .post(format!("{}/api/{kind}", self.endpoint))
            .json(&json!({ "path": function, "args": args, "format": "json" }))
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        parse_envelope(status, &body)
    }
}

#[async_trait::async_trait]
impl QueryTransport for ConvexHttpTransport {
    async fn query(&self, function: &str, args: &Value) -> Result<Value, TransportError> {
        self.call("query", function, args).await
    }

    async fn mutation(&self, function: &str, args: &Value) -> Result<Value, TransportError> {
        self.call("mutation", function, args).await
    }
}

/// Decode a response. Function errors come back as 4xx/5xx with an error
/// envelope, so the envelope is tried before the status.
pub(crate) fn parse_envelope(status: StatusCode, body: &str) -> Result<Value, TransportError> {
    match (status.is_success(), serde_json::from_str::<Envelope>(body)) {
        (_, Ok(Envelope::Error { error_message })) => Err(TransportError::Function(error_message)),
        (true, Ok(Envelope::Success { value })) => Ok(value),
        (true, Err(e)) => Err(TransportError::InvalidResponse(e.to_string())),
        (false, _) => Err(TransportError::Status { status: status.as_u16(), body: body.to_string() }),
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
