//! Process configuration parsed from environment variables.
//!
//! Required: nothing. A missing database endpoint or auth verifier degrades
//! at runtime instead of refusing to start.
//!
//! Optional:
//! - `PORT`: listen port, default 3002
//! - `APP_ENV`: `preview` (default) or `production`
//! - `DATABASE_URL`: real-time database deployment URL
//! - `ASSETS_DIR`: directory served under `/assets`
//! - `AUTH_VERIFY_URL`, `AUTH_TIMEOUT_SECS`: see [`crate::auth::AuthConfig`]
//! - `AUTH_PUBLISHABLE_KEY`: exposed to the browser through the auth provider

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::AuthConfig;

pub const DEFAULT_PORT: u16 = 3002;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0:?}")]
    InvalidPort(String),
    #[error("unknown APP_ENV: {0} (expected 'production' or 'preview')")]
    UnknownBuildMode(String),
    #[error("invalid AUTH_TIMEOUT_SECS: {0:?} (expected a positive number of seconds)")]
    InvalidAuthTimeout(String),
}

// =============================================================================
// BUILD MODE
// =============================================================================

/// Deployment flavour. Production strips info/debug output the way the
/// bundled client strips console calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Production,
    Preview,
}

impl BuildMode {
    /// Read `APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBuildMode`] for anything other than
    /// `production` or `preview`.
    pub fn from_env() -> Result<Self, ConfigError> {
        parse_build_mode(std::env::var("APP_ENV").ok().as_deref())
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Preview => "preview",
        }
    }

    #[must_use]
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Self::Production => "warn",
            Self::Preview => "debug",
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub build_mode: BuildMode,
    /// `None` when unset or blank; the router factory decides how to degrade.
    pub database_url: Option<String>,
    pub assets_dir: PathBuf,
    /// `None` disables identity lookup (every request is anonymous).
    pub auth: Option<AuthConfig>,
    pub auth_publishable_key: Option<String>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT`, `APP_ENV` or `AUTH_TIMEOUT_SECS` is set to
    /// an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let build_mode = BuildMode::from_env()?;
        let database_url = non_blank(std::env::var("DATABASE_URL").ok());
        let assets_dir = std::env::var("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"));
        let auth = AuthConfig::from_env()?;
        let auth_publishable_key = non_blank(std::env::var("AUTH_PUBLISHABLE_KEY").ok());

        Ok(Self { port, build_mode, database_url, assets_dir, auth, auth_publishable_key })
    }
}

/// Zero is rejected: every lookup would time out and all users would
/// silently become anonymous.
pub(crate) fn parse_timeout_secs(raw: Option<&str>, default: u64) -> Result<Duration, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Duration::from_secs(default)),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidAuthTimeout(value.to_string())),
        },
    }
}

/// Trim and drop empty values so `KEY=` behaves like an unset variable.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(value.to_string())),
    }
}

fn parse_build_mode(raw: Option<&str>) -> Result<BuildMode, ConfigError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "preview") => Ok(BuildMode::Preview),
        Some("production") => Ok(BuildMode::Production),
        Some(other) => Err(ConfigError::UnknownBuildMode(other.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
