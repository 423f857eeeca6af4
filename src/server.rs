//! Server entry: axum application around the shared router.
//!
//! SYSTEM CONTEXT
//! ==============
//! Static assets and the health probe are plain routes; every other path is
//! a page navigation resolved by [`AppRouter`]. Each request runs its own
//! navigation, so identity is looked up fresh per request and never shared.

use std::path::Path;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::router::AppRouter;
use crate::routing::{NavigationOutcome, NavigationToken};

/// Build the axum application.
pub fn app(router: AppRouter, assets_dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route_service("/favicon.svg", ServeFile::new(assets_dir.join("favicon.svg")))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .fallback(render_page)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(router)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Resolve the request path through the route tree and answer with a
/// document (200 or 404) or a temporary redirect.
async fn render_page(State(router): State<AppRouter>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let navigation_id = Uuid::new_v4();
    let span = tracing::info_span!("navigation", %navigation_id, path = %uri.path());
    async move {
        match router.navigate(uri.path(), &headers, &NavigationToken::detached()).await {
            NavigationOutcome::Resolved(route) => {
                let status = if route.found { StatusCode::OK } else { StatusCode::NOT_FOUND };
                tracing::debug!(route = %route.route_id, %status, "rendering");
                (status, Html(router.render_document(&route))).into_response()
            }
            NavigationOutcome::Redirect(redirect) => Redirect::temporary(&redirect.to).into_response(),
            // Detached tokens are never superseded.
            NavigationOutcome::Superseded => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
