//! Auth provider seam: credential extraction and identity lookup.
//!
//! ARCHITECTURE
//! ============
//! The provider is an opaque service. It receives the request headers and
//! answers with an identity, no identity, or an error. Session storage and
//! token validation live entirely on the provider side; this module only
//! forwards the credential it finds.

use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::config::{ConfigError, non_blank, parse_timeout_secs};

/// Cookie set by the hosted sign-in flow.
pub const SESSION_COOKIE_NAME: &str = "__session";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("malformed authorization header: {0}")]
    MalformedHeader(&'static str),
    #[error("auth provider request failed: {0}")]
    Transport(String),
    #[error("auth provider returned {0}")]
    Status(StatusCode),
    #[error("auth provider response invalid: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Identity lookup for one request. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the caller's user id from the request headers.
    ///
    /// `Ok(None)` means the caller is anonymous.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the credential is malformed or the
    /// provider cannot answer.
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError>;
}

/// Find the session credential: a bearer token first, then the session cookie.
///
/// # Errors
///
/// Returns [`AuthError::MalformedHeader`] if an `Authorization` header is
/// present but is not a non-empty UTF-8 bearer token.
pub fn extract_credential(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    if let Some(raw) = headers.get(AUTHORIZATION) {
        let value = raw.to_str().map_err(|_| AuthError::MalformedHeader("not valid UTF-8"))?;
        let (scheme, token) = value
            .trim_start()
            .split_once(' ')
            .ok_or(AuthError::MalformedHeader("expected Bearer scheme"))?;
        // Auth schemes are case-insensitive (RFC 7235).
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::MalformedHeader("expected Bearer scheme"));
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MalformedHeader("empty bearer token"));
        }
        return Ok(Some(token.to_owned()));
    }

    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(SESSION_COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned))
}

// =============================================================================
// HTTP PROVIDER
// =============================================================================

/// Remote verifier configuration loaded from environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub verify_url: String,
    pub timeout: Duration,
}

impl AuthConfig {
    /// Load from `AUTH_VERIFY_URL` and `AUTH_TIMEOUT_SECS`.
    /// Returns `Ok(None)` if the verify URL is missing (lookups are disabled).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAuthTimeout`] if the timeout is set but
    /// is not a positive integer.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(verify_url) = non_blank(std::env::var("AUTH_VERIFY_URL").ok()) else {
            return Ok(None);
        };
        let timeout =
            parse_timeout_secs(std::env::var("AUTH_TIMEOUT_SECS").ok().as_deref(), DEFAULT_AUTH_TIMEOUT_SECS)?;
        Ok(Some(Self { verify_url, timeout }))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    #[serde(alias = "sub", default)]
    pub(crate) user_id: Option<String>,
}

/// Forwards the session credential to a remote verification endpoint.
pub struct HttpAuthProvider {
    http: reqwest::Client,
    config: AuthConfig,
}

impl HttpAuthProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        let Some(token) = extract_credential(headers)? else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(&self.config.verify_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        parse_verify_response(status, &body)
    }
}

/// Interpret the verifier's answer. Rejections mean "anonymous", not failure.
pub(crate) fn parse_verify_response(status: StatusCode, body: &str) -> Result<Option<String>, AuthError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
        s if s.is_success() => {
            let parsed: VerifyResponse =
                serde_json::from_str(body).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            Ok(parsed.user_id)
        }
        s => Err(AuthError::Status(s)),
    }
}

// =============================================================================
// ANONYMOUS PROVIDER
// =============================================================================

/// Used when no verifier is configured. Every request is anonymous.
pub struct AnonymousAuthProvider;

#[async_trait::async_trait]
impl AuthProvider for AnonymousAuthProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
