use maud::PreEscaped;

use crate::auth::RequestAuthContext;
use crate::test_helpers::test_context;

fn empty() -> maud::Markup {
    PreEscaped(String::new())
}

#[test]
fn home_lists_the_stack() {
    let html = super::home::page(&test_context(), empty()).into_string();
    assert!(html.contains("TanStack Convex Template"));
    for badge in ["TanStack Start", "Convex", "Cloudflare Workers", "Clerk Auth", "Tailwind CSS"] {
        assert!(html.contains(badge), "missing badge {badge}");
    }
}

#[test]
fn dashboard_exposes_user_id() {
    let ctx = test_context().with_auth(RequestAuthContext::new(Some("user_123".into())));
    let html = super::dashboard::page(&ctx, empty()).into_string();
    assert!(html.contains("Dashboard"));
    assert!(html.contains(r#"data-user-id="user_123""#));
}

#[test]
fn authed_layout_wraps_outlet() {
    let html = super::authed::layout(&test_context(), PreEscaped("<p>inner</p>".into())).into_string();
    assert_eq!(html, r#"<div class="min-h-screen bg-background"><p>inner</p></div>"#);
}

#[test]
fn not_found_links_home() {
    let html = super::not_found::page(&test_context(), empty()).into_string();
    assert!(html.contains("404"));
    assert!(html.contains("Page not found"));
    assert!(html.contains(r#"href="/""#));
    assert!(html.contains("Go Home"));
}
