//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::fmt;

use thiserror::Error;

/// Placeholder secret shipped in old deployment templates.
pub const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// Minimum accepted length of the cookie-signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// Default Beehiiv API origin.
pub const DEFAULT_API_BASE: &str = "https://api.beehiiv.com";

// == Config Error ==
/// Startup configuration failures. The server refuses to start on any of these.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("COOKIE_SECRET is not set")]
    MissingSecret,

    #[error("COOKIE_SECRET is the placeholder value")]
    PlaceholderSecret,

    #[error("COOKIE_SECRET must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
}

// == Platform Credentials ==
/// Credentials for the newsletter platform.
#[derive(Clone)]
pub struct PlatformCredentials {
    /// Bearer token
    pub api_key: String,
    /// Publication identifier, always `pub_`-prefixed
    pub publication_id: String,
}

impl PlatformCredentials {
    /// Creates credentials, adding the `pub_` prefix when missing.
    pub fn new(api_key: impl Into<String>, publication_id: &str) -> Self {
        Self {
            api_key: api_key.into(),
            publication_id: normalize_publication_id(publication_id),
        }
    }
}

impl fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("api_key", &"<redacted>")
            .field("publication_id", &self.publication_id)
            .finish()
    }
}

/// Prefixes a bare publication id with `pub_`.
pub fn normalize_publication_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with("pub_") {
        id.to_string()
    } else {
        format!("pub_{}", id)
    }
}

/// Server configuration parameters.
#[derive(Clone)]
pub struct Config {
    /// Newsletter platform credentials; `None` makes dependent endpoints answer 500
    pub platform: Option<PlatformCredentials>,
    /// Newsletter platform API origin
    pub api_base: String,
    /// HMAC key for subscriber cookies
    pub cookie_secret: String,
    /// HTTP server port
    pub server_port: u16,
    /// Article cache TTL in seconds
    pub cache_ttl: u64,
    /// Background refresh interval in seconds, 0 disables the task
    pub refresh_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BEEHIIV_API_KEY` / `BEEHIIV_PUBLICATION_ID` - platform credentials (optional)
    /// - `BEEHIIV_API_BASE` - API origin (default: https://api.beehiiv.com)
    /// - `COOKIE_SECRET` - cookie signing secret (required)
    /// - `PORT` - HTTP server port (default: 3002)
    /// - `ARTICLE_CACHE_TTL` - cache TTL in seconds (default: 300)
    /// - `CACHE_REFRESH_INTERVAL` - refresh interval in seconds (default: 240)
    pub fn from_env() -> Result<Self, ConfigError> {
        let platform = match (
            non_empty_var("BEEHIIV_API_KEY"),
            non_empty_var("BEEHIIV_PUBLICATION_ID"),
        ) {
            (Some(key), Some(publication)) => Some(PlatformCredentials::new(key, &publication)),
            _ => None,
        };

        let cookie_secret = validate_secret(env::var("COOKIE_SECRET").ok())?;

        Ok(Self {
            platform,
            api_base: non_empty_var("BEEHIIV_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            cookie_secret,
            server_port: parsed_var("PORT").unwrap_or(3002),
            cache_ttl: parsed_var("ARTICLE_CACHE_TTL").unwrap_or(300),
            refresh_interval: parsed_var("CACHE_REFRESH_INTERVAL").unwrap_or(240),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("platform", &self.platform)
            .field("api_base", &self.api_base)
            .field("cookie_secret", &"<redacted>")
            .field("server_port", &self.server_port)
            .field("cache_ttl", &self.cache_ttl)
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

/// Rejects a missing, placeholder or short signing secret.
pub fn validate_secret(secret: Option<String>) -> Result<String, ConfigError> {
    let secret = secret
        .filter(|s| !s.trim().is_empty())
        .ok_or(ConfigError::MissingSecret)?;

    if secret == PLACEHOLDER_SECRET {
        return Err(ConfigError::PlaceholderSecret);
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::WeakSecret);
    }
    Ok(secret)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
