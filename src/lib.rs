//! Server-rendered starter: route tree with an auth-gated layout, a cached
//! query client for the real-time database, and matching server and client
//! entry points.

pub mod auth;
pub mod client;
pub mod config;
pub mod pages;
pub mod providers;
pub mod query;
pub mod router;
pub mod routing;
pub mod server;
pub mod shell;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_helpers;
