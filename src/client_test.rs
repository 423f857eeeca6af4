use super::*;
use std::time::Duration;

use crate::test_helpers::{GatedAuthProvider, StaticAuthProvider, test_router};

async fn server_document(router: &AppRouter, path: &str) -> String {
    match router.navigate(path, &HeaderMap::new(), &NavigationToken::detached()).await {
        NavigationOutcome::Resolved(route) => router.render_document(&route),
        _ => panic!("expected a rendered document for {path}"),
    }
}

fn rendered(nav: ClientNavigation) -> Committed {
    match nav {
        ClientNavigation::Rendered(committed) => committed,
        ClientNavigation::Superseded => panic!("unexpected supersede"),
    }
}

#[tokio::test]
async fn hydration_reproduces_server_document() {
    let provider = Arc::new(StaticAuthProvider::user("user_123"));
    for path in ["/", "/dashboard", "/_authed/dashboard", "/unknown-path"] {
        let server_html = server_document(&test_router(provider.clone()), path).await;
        let navigator = Navigator::hydrate(test_router(provider.clone()), &server_html).unwrap();
        assert_eq!(navigator.committed().unwrap().html, server_html, "mismatch for {path}");
    }
}

#[tokio::test]
async fn hydration_does_not_refetch_identity() {
    let server_provider = Arc::new(StaticAuthProvider::user("user_123"));
    let server_html = server_document(&test_router(server_provider), "/dashboard").await;

    let client_provider = Arc::new(StaticAuthProvider::anonymous());
    let navigator = Navigator::hydrate(test_router(client_provider.clone()), &server_html).unwrap();
    assert_eq!(client_provider.calls(), 0);
    assert_eq!(navigator.committed().unwrap().route.context.user_id(), Some("user_123"));
}

#[test]
fn hydration_without_state_fails() {
    let router = test_router(Arc::new(StaticAuthProvider::anonymous()));
    assert!(Navigator::hydrate(router, "<html><body></body></html>").is_err());
}

#[test]
fn hydration_treats_empty_user_id_as_anonymous() {
    let router = test_router(Arc::new(StaticAuthProvider::anonymous()));
    let doc = format!(
        r#"<script id="{}" type="application/json">{{"pathname":"/_authed/dashboard","auth":{{"userId":""}}}}</script>"#,
        crate::shell::STATE_SCRIPT_ID
    );
    let navigator = Navigator::hydrate(router, &doc).unwrap();
    let committed = navigator.committed().unwrap();
    assert_eq!(committed.route.context.user_id(), None);
    assert!(!committed.html.contains("data-user-id"));
}

#[tokio::test]
async fn authenticated_navigation_commits_dashboard() {
    let navigator = Navigator::new(test_router(Arc::new(StaticAuthProvider::user("user_123"))));
    let committed = rendered(navigator.navigate("/_authed/dashboard", &HeaderMap::new()).await.unwrap());
    assert_eq!(committed.route.route_id, "/_authed/dashboard");
    assert!(committed.html.contains("Dashboard"));
    assert_eq!(navigator.committed().unwrap().id, committed.id);
}

#[tokio::test]
async fn anonymous_navigation_follows_redirect_home() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let navigator = Navigator::new(test_router(provider.clone()));
    let committed = rendered(navigator.navigate("/_authed/dashboard", &HeaderMap::new()).await.unwrap());

    assert_eq!(committed.route.pathname, "/");
    assert!(!committed.html.contains("Welcome to your dashboard"));
    // The redirect target is a fresh navigation with its own lookup.
    assert_eq!(provider.calls(), 2);
    assert_eq!(committed.id, 2);
}

#[tokio::test]
async fn each_navigation_refetches_identity() {
    let provider = Arc::new(StaticAuthProvider::user("user_123"));
    let navigator = Navigator::new(test_router(provider.clone()));
    navigator.navigate("/", &HeaderMap::new()).await.unwrap();
    navigator.navigate("/dashboard", &HeaderMap::new()).await.unwrap();
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn superseded_navigation_never_commits_its_identity() {
    let provider = Arc::new(GatedAuthProvider::new("user_slow", "user_fast"));
    let navigator = Arc::new(Navigator::new(test_router(provider.clone())));

    let slow = tokio::spawn({
        let navigator = Arc::clone(&navigator);
        async move { navigator.navigate("/dashboard", &HeaderMap::new()).await }
    });
    // Wait until the first navigation is parked inside the identity lookup.
    tokio::time::timeout(Duration::from_secs(2), provider.entered.notified())
        .await
        .unwrap();

    let fast = rendered(navigator.navigate("/dashboard", &HeaderMap::new()).await.unwrap());
    assert_eq!(fast.route.context.user_id(), Some("user_fast"));

    provider.release.notify_one();
    let slow = slow.await.unwrap().unwrap();
    assert!(matches!(slow, ClientNavigation::Superseded));

    let committed = navigator.committed().unwrap();
    assert_eq!(committed.id, fast.id);
    assert_eq!(committed.route.context.user_id(), Some("user_fast"));
}
