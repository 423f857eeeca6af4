use maud::{Markup, html};

use crate::routing::RouteContext;

/// Layout around every guarded route. Only renders once the guard passed.
pub fn layout(_ctx: &RouteContext, outlet: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-background" { (outlet) }
    }
}
