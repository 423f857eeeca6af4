//! Client entry: hydration and client-side navigation.
//!
//! ARCHITECTURE
//! ============
//! The navigator owns a router built by the same factory as the server. It
//! starts from the server document (hydration) and afterwards resolves
//! route changes itself.
//!
//! Every navigation takes the next id from a shared counter. Hooks check the
//! counter after each await, so when navigations overlap only the newest one
//! commits; an older identity lookup finishing late is discarded instead of
//! leaking into the newer navigation's context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::HeaderMap;

use crate::router::AppRouter;
use crate::routing::{NavigationOutcome, NavigationToken, ResolvedRoute, navigation};
use crate::shell::{DehydratedState, HydrateError};
use crate::telemetry::codes;

pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum NavigateError {
    #[error("too many redirects navigating to {0}")]
    TooManyRedirects(String),
}

/// The navigation currently on screen.
#[derive(Clone)]
pub struct Committed {
    pub id: u64,
    pub route: ResolvedRoute,
    pub html: String,
}

pub enum ClientNavigation {
    Rendered(Committed),
    /// A newer navigation started before this one finished.
    Superseded,
}

pub struct Navigator {
    router: AppRouter,
    latest: Arc<AtomicU64>,
    committed: Mutex<Option<Committed>>,
}

impl Navigator {
    #[must_use]
    pub fn new(router: AppRouter) -> Self {
        Self { router, latest: Arc::new(AtomicU64::new(0)), committed: Mutex::new(None) }
    }

    /// Adopt a server-rendered document without re-running any hook.
    ///
    /// The matched route is re-rendered from the dehydrated context; the
    /// result is what the browser would attach to.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError`] if the document carries no usable state.
    pub fn hydrate(router: AppRouter, document: &str) -> Result<Self, HydrateError> {
        let state = DehydratedState::extract(document)?;
        let navigator = Self::new(router);
        let route = navigator.rehydrate_route(state);
        let html = navigator.router.render_document(&route);
        *navigator.lock_committed() = Some(Committed { id: 0, route, html });
        Ok(navigator)
    }

    #[must_use]
    pub fn committed(&self) -> Option<Committed> {
        self.lock_committed().clone()
    }

    /// Navigate to `pathname`, following redirects as new navigations.
    ///
    /// # Errors
    ///
    /// Returns [`NavigateError::TooManyRedirects`] if the redirect chain does
    /// not settle within [`MAX_REDIRECTS`] hops.
    pub async fn navigate(&self, pathname: &str, request: &HeaderMap) -> Result<ClientNavigation, NavigateError> {
        let mut target = pathname.to_string();
        let mut id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        for _ in 0..=MAX_REDIRECTS {
            let token = NavigationToken::tracked(id, Arc::clone(&self.latest));
            match self.router.navigate(&target, request, &token).await {
                NavigationOutcome::Resolved(route) => return Ok(self.commit(id, route)),
                NavigationOutcome::Superseded => return Ok(ClientNavigation::Superseded),
                NavigationOutcome::Redirect(redirect) => {
                    // The follow-up is a new navigation, unless a newer one already took over.
                    if self
                        .latest
                        .compare_exchange(id, id + 1, Ordering::SeqCst, Ordering::SeqCst)
                        .is_err()
                    {
                        return Ok(ClientNavigation::Superseded);
                    }
                    id += 1;
                    target = redirect.to;
                }
            }
        }

        tracing::error!(code = codes::NAVIGATION_REDIRECT_LOOP, from = %pathname, "redirect limit reached");
        Err(NavigateError::TooManyRedirects(pathname.to_string()))
    }

    fn rehydrate_route(&self, state: DehydratedState) -> ResolvedRoute {
        let context = self.router.base_context().with_auth(state.auth);
        navigation::restore(self.router.tree(), context, &state.pathname)
    }

    fn commit(&self, id: u64, route: ResolvedRoute) -> ClientNavigation {
        let html = self.router.render_document(&route);
        let mut committed = self.lock_committed();
        // Re-check under the lock: a newer navigation may have resolved first.
        if self.latest.load(Ordering::SeqCst) != id {
            return ClientNavigation::Superseded;
        }
        let entry = Committed { id, route, html };
        *committed = Some(entry.clone());
        ClientNavigation::Rendered(entry)
    }

    fn lock_committed(&self) -> std::sync::MutexGuard<'_, Option<Committed>> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
