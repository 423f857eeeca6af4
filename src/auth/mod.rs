//! Request-scoped identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root route runs [`AuthContextFetcher::fetch`] once per navigation and
//! merges the result into the route context. Guards downstream only read it.
//!
//! ERROR HANDLING
//! ==============
//! Lookups fail closed. A malformed header, a provider error, or even a
//! panicking provider all produce `{ userId: null }` plus one structured
//! warning. Nothing here can fail the request.

pub mod provider;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::HeaderMap;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::telemetry::codes;
pub use provider::{AnonymousAuthProvider, AuthConfig, AuthError, AuthProvider, HttpAuthProvider};

// =============================================================================
// REQUEST AUTH CONTEXT
// =============================================================================

/// Identity claim for one navigation.
///
/// Serialized as `{"userId": "..."}` or `{"userId": null}`. The key is
/// required when deserializing: a missing key is an error, never "anonymous".
/// An empty id deserializes as `null`, same as [`RequestAuthContext::new`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestAuthContext {
    #[serde(rename = "userId", deserialize_with = "deserialize_user_id")]
    user_id: Option<String>,
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|id| !id.is_empty()))
}

impl RequestAuthContext {
    /// Build a context; empty ids are normalised to anonymous.
    #[must_use]
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id: user_id.filter(|id| !id.is_empty()) }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

// =============================================================================
// FETCHER
// =============================================================================

/// Server-side identity lookup with fail-closed translation.
#[derive(Clone)]
pub struct AuthContextFetcher {
    provider: Arc<dyn AuthProvider>,
}

impl AuthContextFetcher {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the identity for the request carrying `headers`.
    pub async fn fetch(&self, headers: &HeaderMap) -> RequestAuthContext {
        let lookup = AssertUnwindSafe(self.provider.authenticate(headers))
            .catch_unwind()
            .await;

        match lookup {
            Ok(Ok(user_id)) => RequestAuthContext::new(user_id),
            Ok(Err(e)) => {
                tracing::warn!(code = codes::AUTH_LOOKUP_FAILED, error = %e, "auth lookup failed; treating request as anonymous");
                RequestAuthContext::anonymous()
            }
            Err(_) => {
                tracing::error!(code = codes::AUTH_LOOKUP_FAILED, "auth provider panicked; treating request as anonymous");
                RequestAuthContext::anonymous()
            }
        }
    }
}

/// Pick the provider for the process. Missing config means anonymous-only.
#[must_use]
pub fn provider_from_config(config: Option<&AuthConfig>) -> Arc<dyn AuthProvider> {
    let Some(config) = config else {
        tracing::warn!(code = codes::AUTH_PROVIDER_UNCONFIGURED, "AUTH_VERIFY_URL not set; every request is anonymous");
        return Arc::new(AnonymousAuthProvider);
    };

    match HttpAuthProvider::new(config.clone()) {
        Ok(provider) => {
            tracing::info!(verify_url = %config.verify_url, "auth provider configured");
            Arc::new(provider)
        }
        Err(e) => {
            tracing::error!(code = codes::AUTH_PROVIDER_UNCONFIGURED, error = %e, "auth provider init failed; every request is anonymous");
            Arc::new(AnonymousAuthProvider)
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
