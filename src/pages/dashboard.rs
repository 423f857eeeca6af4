use maud::{Markup, html};

use crate::routing::RouteContext;

/// Protected landing page for signed-in users.
pub fn page(ctx: &RouteContext, _outlet: Markup) -> Markup {
    html! {
        div class="container mx-auto px-4 py-8" data-user-id=[ctx.user_id()] {
            h1 class="text-3xl font-bold text-foreground mb-6" { "Dashboard" }
            p class="text-muted-foreground" {
                "Welcome to your dashboard. This is a protected route."
            }
        }
    }
}
