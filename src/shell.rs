//! Document shell rendered around every route.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server sends this document; the client navigator later rebuilds it
//! from the embedded [`DehydratedState`] and must produce the same bytes.
//! The shell therefore has no inputs besides its arguments: no clock, no
//! environment lookups, no side-specific branches.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::RequestAuthContext;

pub const STATE_SCRIPT_ID: &str = "__router_state";
pub const CLIENT_ENTRY_SRC: &str = "/assets/client.js";
pub const DEFAULT_TITLE: &str = "TanStack Convex Template";

#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    #[error("document has no dehydrated router state")]
    MissingState,
    #[error("dehydrated router state invalid: {0}")]
    InvalidState(String),
}

// =============================================================================
// HEAD
// =============================================================================

/// Build-time metadata emitted into `<head>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadMeta {
    pub title: String,
    pub app_version: String,
    pub app_env: String,
}

impl HeadMeta {
    #[must_use]
    pub fn new(app_env: &str) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            app_env: app_env.to_string(),
        }
    }
}

// =============================================================================
// DEHYDRATED STATE
// =============================================================================

/// What the client needs to rebuild the server's render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DehydratedState {
    pub pathname: String,
    pub auth: RequestAuthContext,
}

impl DehydratedState {
    /// JSON safe to inline in a `<script>` element.
    #[must_use]
    pub fn to_script_json(&self) -> String {
        json!({ "pathname": self.pathname, "auth": self.auth })
            .to_string()
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026")
    }

    /// Pull the state back out of a rendered document.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError`] if the state script is missing or its JSON
    /// does not match the expected shape (including a missing `userId`).
    pub fn extract(document: &str) -> Result<Self, HydrateError> {
        let marker = format!(r#"id="{STATE_SCRIPT_ID}""#);
        let start = document.find(&marker).ok_or(HydrateError::MissingState)?;
        let after_tag = document[start..]
            .find('>')
            .map(|i| start + i + 1)
            .ok_or(HydrateError::MissingState)?;
        let end = document[after_tag..]
            .find("</script>")
            .map(|i| after_tag + i)
            .ok_or(HydrateError::MissingState)?;

        serde_json::from_str(&document[after_tag..end]).map_err(|e| HydrateError::InvalidState(e.to_string()))
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[must_use]
pub fn document(head: &HeadMeta, state: &DehydratedState, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="app-version" content=(head.app_version);
                meta name="app-env" content=(head.app_env);
                title { (head.title) }
                link rel="icon" type="image/svg+xml" href="/favicon.svg";
            }
            body data-scroll-restoration="true" {
                (body)
                script id=(STATE_SCRIPT_ID) type="application/json" { (PreEscaped(state.to_script_json())) }
                script type="module" src=(CLIENT_ENTRY_SRC) {}
            }
        }
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
