//! One resolution of the route tree against a URL.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both entry points call [`run`]: the server once per request, the client
//! navigator once per route change. Hooks run strictly in chain order, each
//! awaited before the next starts, so the root's identity merge completes
//! before any guard reads it.
//!
//! A client navigation can be overtaken by a newer one while a hook is
//! suspended. The [`NavigationToken`] is checked after every hook await and a
//! stale navigation resolves as [`NavigationOutcome::Superseded`], dropping
//! whatever its hook produced.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::HeaderMap;

use super::{LoadOutcome, Redirect, RouteContext, RouteNode, RouteTree, route_id};

// =============================================================================
// TOKEN
// =============================================================================

#[derive(Clone)]
pub struct NavigationToken {
    id: u64,
    latest: Option<Arc<AtomicU64>>,
}

impl NavigationToken {
    /// A token that is never superseded (server requests).
    #[must_use]
    pub fn detached() -> Self {
        Self { id: 0, latest: None }
    }

    /// A token that stays current while `latest` still holds `id`.
    #[must_use]
    pub fn tracked(id: u64, latest: Arc<AtomicU64>) -> Self {
        Self { id, latest: Some(latest) }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest
            .as_ref()
            .is_none_or(|latest| latest.load(Ordering::SeqCst) == self.id)
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// A navigation that passed every hook and is ready to render.
#[derive(Clone)]
pub struct ResolvedRoute {
    pub pathname: String,
    pub route_id: String,
    pub chain: Vec<Arc<RouteNode>>,
    pub context: RouteContext,
    /// `false` when only the root matched and the not-found page renders.
    pub found: bool,
}

pub enum NavigationOutcome {
    Resolved(ResolvedRoute),
    Redirect(Redirect),
    Superseded,
}

// =============================================================================
// RUNNER
// =============================================================================

/// Resolve `pathname`, running every hook on the matched chain.
pub async fn run(
    tree: &RouteTree,
    base: RouteContext,
    pathname: &str,
    request: &HeaderMap,
    token: &NavigationToken,
) -> NavigationOutcome {
    let pathname = normalize_path(pathname);
    let (chain, found) = match_or_root(tree, &pathname);

    let mut ctx = base;
    for node in &chain {
        let Some(hook) = node.hook() else {
            continue;
        };

        let outcome = hook.before_load(&ctx, request).await;
        if !token.is_current() {
            tracing::debug!(navigation = token.id(), %pathname, "navigation superseded; discarding hook result");
            return NavigationOutcome::Superseded;
        }

        match outcome {
            LoadOutcome::Proceed(next) => ctx = next,
            LoadOutcome::Redirect(redirect) => {
                tracing::debug!(from = %pathname, to = %redirect.to, "navigation redirected");
                return NavigationOutcome::Redirect(redirect);
            }
        }
    }

    let route_id = route_id(&chain);
    NavigationOutcome::Resolved(ResolvedRoute { pathname, route_id, chain, context: ctx, found })
}

/// Rebuild a resolved route from an already-evaluated context without
/// running hooks. Used when hydrating a server render.
#[must_use]
pub fn restore(tree: &RouteTree, context: RouteContext, pathname: &str) -> ResolvedRoute {
    let pathname = normalize_path(pathname);
    let (chain, found) = match_or_root(tree, &pathname);
    let route_id = route_id(&chain);
    ResolvedRoute { pathname, route_id, chain, context, found }
}

/// Unmatched paths still run the root so the not-found page gets the shell.
fn match_or_root(tree: &RouteTree, pathname: &str) -> (Vec<Arc<RouteNode>>, bool) {
    match tree.match_path(pathname) {
        Some(chain) => (chain, true),
        None => (vec![Arc::clone(tree.root())], false),
    }
}

/// Drop query and fragment, force a leading slash, trim trailing slashes.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
