//! Provider wrapper applied around every rendered route.
//!
//! The wrapper emits the mount points the browser bundle attaches to: auth,
//! database connection, theme, and the toast outlet. Its output depends only
//! on construction-time config, never on which side is rendering.

use maud::{Markup, html};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToasterOptions {
    pub position: &'static str,
    pub close_button: bool,
    pub class: &'static str,
}

impl Default for ToasterOptions {
    fn default() -> Self {
        Self {
            position: "top-right",
            close_button: true,
            class: "bg-background border border-border text-foreground",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Providers {
    pub database_endpoint: String,
    pub auth_publishable_key: Option<String>,
    pub theme: Theme,
    pub toaster: ToasterOptions,
}

impl Providers {
    #[must_use]
    pub fn new(database_endpoint: impl Into<String>, auth_publishable_key: Option<String>) -> Self {
        Self {
            database_endpoint: database_endpoint.into(),
            auth_publishable_key,
            theme: Theme::default(),
            toaster: ToasterOptions::default(),
        }
    }

    /// Nest `children` inside auth → database → theme providers, with the
    /// toast outlet ahead of the page content.
    #[must_use]
    pub fn wrap(&self, children: Markup) -> Markup {
        html! {
            div data-provider="auth" data-publishable-key=[self.auth_publishable_key.as_deref()] {
                div data-provider="database" data-endpoint=(self.database_endpoint) {
                    div data-provider="theme" data-theme=(self.theme.as_str()) {
                        section
                            data-toaster
                            data-position=(self.toaster.position)
                            data-close-button=(if self.toaster.close_button { "true" } else { "false" })
                            class=(self.toaster.class) {}
                        (children)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "providers_test.rs"]
mod tests;
