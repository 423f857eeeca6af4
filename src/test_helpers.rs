//! Mock providers, transports, and router builders shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::HeaderMap;
use serde_json::Value;
use tokio::sync::Notify;

use crate::auth::{AuthError, AuthProvider};
use crate::query::{CachePolicy, QueryClient, QueryTransport, TransportError};
use crate::router::{AppRouter, RouterConfig, create_router_with_transport};
use crate::routing::RouteContext;

// =============================================================================
// AUTH PROVIDERS
// =============================================================================

/// Always answers with the same identity and counts calls.
pub struct StaticAuthProvider {
    user_id: Option<String>,
    calls: AtomicUsize,
}

impl StaticAuthProvider {
    pub fn user(id: &str) -> Self {
        Self { user_id: Some(id.to_string()), calls: AtomicUsize::new(0) }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.user_id.clone())
    }
}

pub struct FailingAuthProvider;

#[async_trait::async_trait]
impl AuthProvider for FailingAuthProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        Err(AuthError::Transport("connection refused".into()))
    }
}

pub struct PanickingAuthProvider;

#[async_trait::async_trait]
impl AuthProvider for PanickingAuthProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        panic!("provider exploded");
    }
}

/// First call parks until released; later calls answer immediately.
/// Used to overlap two navigations deterministically.
pub struct GatedAuthProvider {
    first_user: String,
    later_user: String,
    calls: AtomicUsize,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedAuthProvider {
    pub fn new(first_user: &str, later_user: &str) -> Self {
        Self {
            first_user: first_user.to_string(),
            later_user: later_user.to_string(),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for GatedAuthProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
            return Ok(Some(self.first_user.clone()));
        }
        Ok(Some(self.later_user.clone()))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Answers every call with a swappable canned response.
pub struct MockTransport {
    response: Mutex<Result<Value, TransportError>>,
    query_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl MockTransport {
    pub fn ok(value: Value) -> Arc<Self> {
        Self::with_response(Ok(value))
    }

    pub fn err(error: TransportError) -> Arc<Self> {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<Value, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            query_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_response(&self, response: Result<Value, TransportError>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = response;
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    fn current(&self) -> Result<Value, TransportError> {
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl QueryTransport for MockTransport {
    async fn query(&self, _function: &str, _args: &Value) -> Result<Value, TransportError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers overlap with the in-flight call.
        tokio::task::yield_now().await;
        self.current()
    }

    async fn mutation(&self, _function: &str, _args: &Value) -> Result<Value, TransportError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.current()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn test_router_config(provider: Arc<dyn AuthProvider>) -> RouterConfig {
    RouterConfig::new(Some("https://test-deployment.convex.cloud".into()), provider)
}

/// Router with the given auth provider and a mock database.
pub fn test_router(provider: Arc<dyn AuthProvider>) -> AppRouter {
    create_router_with_transport(&test_router_config(provider), MockTransport::ok(Value::Null))
}

pub fn test_context() -> RouteContext {
    RouteContext::new(QueryClient::new(MockTransport::ok(Value::Null), CachePolicy::default()))
}
