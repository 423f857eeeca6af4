use super::*;
use maud::html;

use crate::test_helpers::test_context;

fn leaf(_ctx: &RouteContext, _outlet: Markup) -> Markup {
    html! { "leaf" }
}

fn frame(_ctx: &RouteContext, outlet: Markup) -> Markup {
    html! { section { (outlet) } }
}

fn missing(_ctx: &RouteContext, _outlet: Markup) -> Markup {
    html! { "missing" }
}

fn tree() -> RouteTree {
    RouteTree::new(
        RouteNode::root().children(vec![
            RouteNode::index().component(leaf),
            RouteNode::path("about").component(leaf),
            RouteNode::pathless("_authed")
                .component(frame)
                .children(vec![RouteNode::path("dashboard").component(leaf)]),
        ]),
        missing,
    )
}

fn matched_id(tree: &RouteTree, path: &str) -> Option<String> {
    tree.match_path(path).map(|chain| route_id(&chain))
}

#[test]
fn index_matches_root_path_only() {
    let t = tree();
    assert_eq!(matched_id(&t, "/").as_deref(), Some("/"));
    assert_eq!(matched_id(&t, "").as_deref(), Some("/"));
}

#[test]
fn static_segment_matches() {
    assert_eq!(matched_id(&tree(), "/about").as_deref(), Some("/about"));
}

#[test]
fn pathless_layout_matches_with_or_without_its_segment() {
    let t = tree();
    assert_eq!(matched_id(&t, "/_authed/dashboard").as_deref(), Some("/_authed/dashboard"));
    assert_eq!(matched_id(&t, "/dashboard").as_deref(), Some("/_authed/dashboard"));
}

#[test]
fn layout_alone_does_not_match() {
    let t = tree();
    assert_eq!(matched_id(&t, "/_authed"), None);
}

#[test]
fn unknown_paths_do_not_match() {
    let t = tree();
    assert_eq!(matched_id(&t, "/unknown-path"), None);
    assert_eq!(matched_id(&t, "/about/extra"), None);
    assert_eq!(matched_id(&t, "/About"), None);
}

#[test]
fn chain_runs_from_root_to_leaf() {
    let chain = tree().match_path("/dashboard").unwrap();
    let segments: Vec<Segment> = chain.iter().map(|n| n.segment()).collect();
    assert_eq!(segments, vec![Segment::Root, Segment::Pathless("_authed"), Segment::Static("dashboard")]);
}

#[test]
fn render_nests_leaf_inside_layouts() {
    let t = tree();
    let chain = t.match_path("/dashboard").unwrap();
    let resolved = ResolvedRoute {
        pathname: "/dashboard".into(),
        route_id: route_id(&chain),
        chain,
        context: test_context(),
        found: true,
    };
    assert_eq!(t.render(&resolved).into_string(), "<section>leaf</section>");
}

#[test]
fn render_unmatched_uses_not_found_component() {
    let t = tree();
    let resolved = ResolvedRoute {
        pathname: "/nope".into(),
        route_id: ROOT_ROUTE_ID.into(),
        chain: vec![Arc::clone(t.root())],
        context: test_context(),
        found: false,
    };
    assert_eq!(t.render(&resolved).into_string(), "missing");
}

#[test]
fn manifest_lists_every_route_depth_first() {
    let ids: Vec<String> = tree().manifest().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["__root__", "/", "/about", "/_authed", "/_authed/dashboard"]);
}
