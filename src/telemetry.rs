//! Tracing setup and structured error codes.
//!
//! DESIGN
//! ======
//! Every recoverable failure is logged once, at the layer that recovers it,
//! with a stable `code` field from [`codes`]. Log aggregation keys off the
//! code instead of the message text.

use tracing_subscriber::EnvFilter;

use crate::config::BuildMode;

/// Stable identifiers attached as the `code` field on warning/error events.
pub mod codes {
    /// Identity lookup failed; the request was treated as unauthenticated.
    pub const AUTH_LOOKUP_FAILED: &str = "auth.lookup_failed";
    /// No auth provider is configured; every request is anonymous.
    pub const AUTH_PROVIDER_UNCONFIGURED: &str = "auth.provider_unconfigured";
    /// The real-time database endpoint is not configured.
    pub const CONFIG_MISSING_DATABASE_URL: &str = "config.missing_database_url";
    /// A mutation sent through the query client failed.
    pub const QUERY_MUTATION_FAILED: &str = "query.mutation_failed";
    /// A background refresh of a stale query failed; the stale value is kept.
    pub const QUERY_REFRESH_FAILED: &str = "query.refresh_failed";
    /// A client navigation kept redirecting past the hop limit.
    pub const NAVIGATION_REDIRECT_LOOP: &str = "navigation.redirect_loop";
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the filter comes from the build mode.
pub fn init(mode: BuildMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
