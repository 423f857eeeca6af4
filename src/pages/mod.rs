//! Route components. Presentational only: everything they know arrives
//! through the [`RouteContext`](crate::routing::RouteContext).

pub mod authed;
pub mod dashboard;
pub mod home;
pub mod not_found;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
