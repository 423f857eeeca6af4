//! Router factory shared by the server and client entry points.
//!
//! DESIGN
//! ======
//! [`create_router`] is the only place the route tree, the query client and
//! the provider wrapper are assembled. Both entries call it with the same
//! [`RouterConfig`], which is what keeps server output and client hydration
//! structurally identical. Nothing here is a process-wide singleton: each
//! call builds fresh clients and the caller owns their lifetime.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{AuthContextFetcher, AuthProvider};
use crate::config::AppConfig;
use crate::pages;
use crate::providers::Providers;
use crate::query::{CachePolicy, ConvexHttpTransport, QueryClient, QueryTransport, TransportError};
use crate::routing::{
    AuthGuard, NavigationOutcome, NavigationToken, ResolvedRoute, RootLoader, RouteContext, RouteNode, RouteTree,
    navigation,
};
use crate::shell::{self, DehydratedState, HeadMeta};
use crate::telemetry::codes;

/// Inputs to [`create_router`].
#[derive(Clone)]
pub struct RouterConfig {
    pub database_url: Option<String>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub auth_publishable_key: Option<String>,
    pub head: HeadMeta,
    pub cache_policy: CachePolicy,
}

impl RouterConfig {
    #[must_use]
    pub fn new(database_url: Option<String>, auth_provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            database_url,
            auth_provider,
            auth_publishable_key: None,
            head: HeadMeta::new("preview"),
            cache_policy: CachePolicy::default(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig, auth_provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            database_url: config.database_url.clone(),
            auth_provider,
            auth_publishable_key: config.auth_publishable_key.clone(),
            head: HeadMeta::new(config.build_mode.as_str()),
            cache_policy: CachePolicy::default(),
        }
    }
}

/// Fully wired router. Cloning shares the same tree and clients.
#[derive(Clone)]
pub struct AppRouter {
    tree: Arc<RouteTree>,
    query_client: QueryClient,
    providers: Arc<Providers>,
    head: Arc<HeadMeta>,
}

/// Build the router with the HTTP database transport.
///
/// A missing database URL is logged and replaced with an empty endpoint;
/// queries then fail on first use instead of here.
///
/// # Errors
///
/// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
pub fn create_router(config: &RouterConfig) -> Result<AppRouter, TransportError> {
    let endpoint = database_endpoint(config);
    let transport = Arc::new(ConvexHttpTransport::new(&endpoint)?);
    Ok(assemble(config, endpoint, transport))
}

/// Build the router around a caller-supplied transport.
#[must_use]
pub fn create_router_with_transport(config: &RouterConfig, transport: Arc<dyn QueryTransport>) -> AppRouter {
    let endpoint = database_endpoint(config);
    assemble(config, endpoint, transport)
}

fn database_endpoint(config: &RouterConfig) -> String {
    match config.database_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            tracing::error!(code = codes::CONFIG_MISSING_DATABASE_URL, "missing DATABASE_URL; database calls will fail");
            String::new()
        }
    }
}

fn assemble(config: &RouterConfig, endpoint: String, transport: Arc<dyn QueryTransport>) -> AppRouter {
    let fetcher = AuthContextFetcher::new(Arc::clone(&config.auth_provider));
    AppRouter {
        tree: Arc::new(route_tree(fetcher)),
        query_client: QueryClient::new(transport, config.cache_policy),
        providers: Arc::new(Providers::new(endpoint, config.auth_publishable_key.clone())),
        head: Arc::new(config.head.clone()),
    }
}

/// `/`, `/_authed/dashboard`, and the not-found fallback.
fn route_tree(fetcher: AuthContextFetcher) -> RouteTree {
    let root = RouteNode::root()
        .before_load(Arc::new(RootLoader::new(fetcher)))
        .children(vec![
            RouteNode::index().component(pages::home::page),
            RouteNode::pathless("_authed")
                .before_load(Arc::new(AuthGuard::default()))
                .component(pages::authed::layout)
                .children(vec![RouteNode::path("dashboard").component(pages::dashboard::page)]),
        ]);
    RouteTree::new(root, pages::not_found::page)
}

impl AppRouter {
    #[must_use]
    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    #[must_use]
    pub fn query_client(&self) -> &QueryClient {
        &self.query_client
    }

    #[must_use]
    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Fresh base context for one navigation.
    #[must_use]
    pub fn base_context(&self) -> RouteContext {
        RouteContext::new(self.query_client.clone())
    }

    /// Resolve `pathname` for the request carrying `headers`.
    pub async fn navigate(&self, pathname: &str, headers: &HeaderMap, token: &NavigationToken) -> NavigationOutcome {
        navigation::run(&self.tree, self.base_context(), pathname, headers, token).await
    }

    /// Dehydrated state for a resolved navigation.
    #[must_use]
    pub fn dehydrate(&self, resolved: &ResolvedRoute) -> DehydratedState {
        DehydratedState {
            pathname: resolved.pathname.clone(),
            auth: resolved.context.auth().cloned().unwrap_or_default(),
        }
    }

    /// Full HTML document for a resolved navigation.
    #[must_use]
    pub fn render_document(&self, resolved: &ResolvedRoute) -> String {
        let body = self.providers.wrap(self.tree.render(resolved));
        shell::document(&self.head, &self.dehydrate(resolved), body).into_string()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
