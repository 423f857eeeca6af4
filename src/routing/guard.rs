//! Pre-render hooks: the root identity loader and the authed layout guard.
//!
//! DESIGN
//! ======
//! Hooks answer with a tagged [`LoadOutcome`] instead of unwinding with a
//! redirect signal. The navigation runner matches on it and stops at the
//! first redirect, so no descendant hook or component runs afterwards.

use axum::http::HeaderMap;

use crate::auth::AuthContextFetcher;

use super::RouteContext;

/// Where the guard sends anonymous callers.
pub const PUBLIC_LANDING_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
}

impl Redirect {
    #[must_use]
    pub fn to(path: impl Into<String>) -> Self {
        Self { to: path.into() }
    }
}

pub enum LoadOutcome {
    /// Continue with this (possibly augmented) context.
    Proceed(RouteContext),
    /// Abandon this navigation and start a new one at the target.
    Redirect(Redirect),
}

/// Hook run before a route and its descendants render.
#[async_trait::async_trait]
pub trait BeforeLoad: Send + Sync {
    async fn before_load(&self, ctx: &RouteContext, request: &HeaderMap) -> LoadOutcome;
}

// =============================================================================
// ROOT LOADER
// =============================================================================

/// Root hook: resolve the identity once and merge it under `userId`.
pub struct RootLoader {
    fetcher: AuthContextFetcher,
}

impl RootLoader {
    #[must_use]
    pub fn new(fetcher: AuthContextFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl BeforeLoad for RootLoader {
    async fn before_load(&self, ctx: &RouteContext, request: &HeaderMap) -> LoadOutcome {
        let auth = self.fetcher.fetch(request).await;
        tracing::debug!(authenticated = auth.is_authenticated(), "auth context merged");
        LoadOutcome::Proceed(ctx.with_auth(auth))
    }
}

// =============================================================================
// AUTH GUARD
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The root merge has not happened yet.
    Pending,
    Authorized,
    Redirecting,
}

impl GuardState {
    /// Only an explicit non-null `userId` authorizes.
    #[must_use]
    pub fn evaluate(ctx: &RouteContext) -> Self {
        match ctx.auth() {
            None => Self::Pending,
            Some(auth) if auth.is_authenticated() => Self::Authorized,
            Some(_) => Self::Redirecting,
        }
    }
}

/// Layout hook that turns anonymous navigations into a redirect.
pub struct AuthGuard {
    redirect_to: String,
}

impl AuthGuard {
    #[must_use]
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self { redirect_to: redirect_to.into() }
    }
}

impl Default for AuthGuard {
    fn default() -> Self {
        Self::new(PUBLIC_LANDING_PATH)
    }
}

#[async_trait::async_trait]
impl BeforeLoad for AuthGuard {
    async fn before_load(&self, ctx: &RouteContext, _request: &HeaderMap) -> LoadOutcome {
        match GuardState::evaluate(ctx) {
            GuardState::Authorized => LoadOutcome::Proceed(ctx.clone()),
            // A guard that runs before the root merge must not let anything through.
            GuardState::Pending | GuardState::Redirecting => LoadOutcome::Redirect(Redirect::to(&self.redirect_to)),
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
