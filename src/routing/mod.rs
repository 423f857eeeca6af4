//! Declarative route tree.
//!
//! ARCHITECTURE
//! ============
//! Routes are data: each node has a path segment, an optional pre-render
//! hook, an optional component, and children. Matching a URL yields the chain
//! of nodes from the root to a leaf; the navigation runner walks that chain
//! running hooks in order, then components render leaf-first, each wrapping
//! its child's output as the outlet.
//!
//! Pathless layout segments (`_authed`) group routes under a shared hook
//! without adding to the public URL. The segment is still accepted when it
//! appears literally, so `/_authed/dashboard` and `/dashboard` are the same
//! route.

pub mod context;
pub mod guard;
pub mod navigation;

use std::sync::Arc;

use maud::{Markup, PreEscaped};

pub use context::RouteContext;
pub use guard::{AuthGuard, BeforeLoad, GuardState, LoadOutcome, Redirect, RootLoader};
pub use navigation::{NavigationOutcome, NavigationToken, ResolvedRoute};

pub const ROOT_ROUTE_ID: &str = "__root__";

/// Renders a route given the context and its already-rendered child.
pub type Component = fn(&RouteContext, Markup) -> Markup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Root,
    /// Matches only when no path remains (`/`).
    Index,
    Static(&'static str),
    Pathless(&'static str),
}

// =============================================================================
// NODE
// =============================================================================

pub struct RouteNode {
    segment: Segment,
    before_load: Option<Arc<dyn BeforeLoad>>,
    component: Option<Component>,
    children: Vec<Arc<RouteNode>>,
}

impl RouteNode {
    fn with_segment(segment: Segment) -> Self {
        Self { segment, before_load: None, component: None, children: Vec::new() }
    }

    #[must_use]
    pub fn root() -> Self {
        Self::with_segment(Segment::Root)
    }

    #[must_use]
    pub fn index() -> Self {
        Self::with_segment(Segment::Index)
    }

    #[must_use]
    pub fn path(segment: &'static str) -> Self {
        Self::with_segment(Segment::Static(segment))
    }

    #[must_use]
    pub fn pathless(id: &'static str) -> Self {
        Self::with_segment(Segment::Pathless(id))
    }

    #[must_use]
    pub fn before_load(mut self, hook: Arc<dyn BeforeLoad>) -> Self {
        self.before_load = Some(hook);
        self
    }

    #[must_use]
    pub fn component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    #[must_use]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    #[must_use]
    pub fn hook(&self) -> Option<&Arc<dyn BeforeLoad>> {
        self.before_load.as_ref()
    }
}

// =============================================================================
// TREE
// =============================================================================

/// One row of [`RouteTree::manifest`]: enough to compare two trees'
/// structure without comparing hook or component identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteManifestEntry {
    pub id: String,
    pub depth: usize,
    pub has_hook: bool,
    pub has_component: bool,
}

pub struct RouteTree {
    root: Arc<RouteNode>,
    not_found: Component,
}

impl RouteTree {
    #[must_use]
    pub fn new(root: RouteNode, not_found: Component) -> Self {
        Self { root: Arc::new(root), not_found }
    }

    #[must_use]
    pub fn root(&self) -> &Arc<RouteNode> {
        &self.root
    }

    /// Chain of nodes from the root to the matched leaf.
    #[must_use]
    pub fn match_path(&self, pathname: &str) -> Option<Vec<Arc<RouteNode>>> {
        let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
        let mut chain = Vec::new();
        match_node(&self.root, &segments, &mut chain).then_some(chain)
    }

    /// Render the matched chain, or the not-found component for unmatched
    /// paths. The document shell is not part of this output.
    #[must_use]
    pub fn render(&self, resolved: &ResolvedRoute) -> Markup {
        if !resolved.found {
            return (self.not_found)(&resolved.context, PreEscaped(String::new()));
        }

        resolved
            .chain
            .iter()
            .rev()
            .fold(PreEscaped(String::new()), |outlet, node| match node.component {
                Some(component) => component(&resolved.context, outlet),
                None => outlet,
            })
    }

    /// Depth-first listing of every route id.
    #[must_use]
    pub fn manifest(&self) -> Vec<RouteManifestEntry> {
        let mut out = Vec::new();
        let mut chain = Vec::new();
        collect_manifest(&self.root, 0, &mut chain, &mut out);
        out
    }
}

/// Route id for a matched chain, e.g. `/_authed/dashboard`.
#[must_use]
pub fn route_id(chain: &[Arc<RouteNode>]) -> String {
    let mut id = String::new();
    for node in chain {
        match node.segment {
            Segment::Root => {}
            Segment::Index => id.push('/'),
            Segment::Static(s) | Segment::Pathless(s) => {
                id.push('/');
                id.push_str(s);
            }
        }
    }
    if id.is_empty() { ROOT_ROUTE_ID.to_string() } else { id }
}

fn match_node(node: &Arc<RouteNode>, segments: &[&str], chain: &mut Vec<Arc<RouteNode>>) -> bool {
    let candidates: Vec<&[&str]> = match node.segment {
        Segment::Root => vec![segments],
        Segment::Index if segments.is_empty() => vec![segments],
        Segment::Index => return false,
        Segment::Static(s) => match segments.split_first() {
            Some((first, rest)) if *first == s => vec![rest],
            _ => return false,
        },
        // Consume the literal segment if present, else pass through.
        Segment::Pathless(s) => match segments.split_first() {
            Some((first, rest)) if *first == s => vec![rest, segments],
            _ => vec![segments],
        },
    };

    chain.push(Arc::clone(node));
    for rest in candidates {
        if node.children.is_empty() {
            if rest.is_empty() && node.component.is_some() {
                return true;
            }
            continue;
        }
        if node.children.iter().any(|child| match_node(child, rest, chain)) {
            return true;
        }
    }
    chain.pop();
    false
}

fn collect_manifest(
    node: &Arc<RouteNode>,
    depth: usize,
    chain: &mut Vec<Arc<RouteNode>>,
    out: &mut Vec<RouteManifestEntry>,
) {
    chain.push(Arc::clone(node));
    out.push(RouteManifestEntry {
        id: route_id(chain),
        depth,
        has_hook: node.before_load.is_some(),
        has_component: node.component.is_some(),
    });
    for child in &node.children {
        collect_manifest(child, depth + 1, chain, out);
    }
    chain.pop();
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
