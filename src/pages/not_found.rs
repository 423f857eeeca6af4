use maud::{Markup, html};

use crate::routing::RouteContext;

/// Fallback for unmatched paths.
pub fn page(_ctx: &RouteContext, _outlet: Markup) -> Markup {
    html! {
        div class="min-h-screen flex items-center justify-center" {
            div class="text-center" {
                h1 class="text-6xl font-bold text-primary mb-4" { "404" }
                p class="text-xl text-muted-foreground mb-8" { "Page not found" }
                a href="/"
                    class="bg-primary text-primary-foreground px-6 py-3 rounded-lg hover:bg-primary/90 transition-colors" {
                    "Go Home"
                }
            }
        }
    }
}
