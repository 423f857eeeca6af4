use maud::{Markup, html};

use crate::routing::RouteContext;

const STACK: [&str; 5] = ["TanStack Start", "Convex", "Cloudflare Workers", "Clerk Auth", "Tailwind CSS"];

/// Public landing page at `/`.
pub fn page(_ctx: &RouteContext, _outlet: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-background" {
            div class="container mx-auto px-4 py-16" {
                div class="text-center" {
                    h1 class="text-4xl font-bold text-foreground mb-4" { "TanStack Convex Template" }
                    p class="text-xl text-muted-foreground mb-8" {
                        "Production-ready full-stack template with SSR, real-time database, and edge deployment"
                    }
                    div class="flex flex-wrap justify-center gap-4 text-sm text-muted-foreground" {
                        @for item in STACK {
                            span class="px-3 py-1 bg-secondary rounded-full" { (item) }
                        }
                    }
                }
            }
        }
    }
}
