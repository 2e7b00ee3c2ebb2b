//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `OSHOP_API_URL` - Base URL of the remote store API (default: `http://o-complex.com:1337`)
//! - `OSHOP_PAGE_SIZE` - Products requested per page (default: 20)
//! - `OSHOP_STATE_FILE` - File backing the persisted cart and phone (default: `.oshop/state.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::num::NonZeroU32;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default remote store API.
pub const DEFAULT_API_URL: &str = "http://o-complex.com:1337";

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default location of the persisted state file.
pub const DEFAULT_STATE_FILE: &str = ".oshop/state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Invalid API URL '{0}': {1}")]
    InvalidApiUrl(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote store API
    pub api_url: Url,
    /// Products requested per page
    pub page_size: NonZeroU32,
    /// File backing durable local storage
    pub state_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("OSHOP_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&api_url)?;

        let page_size = lookup("OSHOP_PAGE_SIZE")
            .unwrap_or_else(|| DEFAULT_PAGE_SIZE.to_string())
            .parse::<NonZeroU32>()
            .map_err(|e| ConfigError::InvalidEnvVar("OSHOP_PAGE_SIZE".to_string(), e.to_string()))?;

        let state_file = lookup("OSHOP_STATE_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        Ok(Self {
            api_url,
            page_size,
            state_file,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[allow(clippy::expect_used)]
fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

/// Parse and check an API base URL. Only `http` and `https` are accepted.
///
/// Used for `OSHOP_API_URL` and for command-line overrides.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] if `raw` is not a URL or uses
/// another scheme.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidApiUrl(raw.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl(
            raw.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://o-complex.com:1337/");
        assert_eq!(config.page_size.get(), 20);
        assert_eq!(config.state_file, PathBuf::from(".oshop/state.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("OSHOP_API_URL", "https://shop.example.com/api/"),
            ("OSHOP_PAGE_SIZE", "5"),
            ("OSHOP_STATE_FILE", "/tmp/cart.json"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.example.com/api/");
        assert_eq!(config.page_size.get(), 5);
        assert_eq!(config.state_file, PathBuf::from("/tmp/cart.json"));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_page_size() {
        for bad in ["0", "-1", "many"] {
            let err = StorefrontConfig::from_lookup(lookup(&[("OSHOP_PAGE_SIZE", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "OSHOP_PAGE_SIZE"));
        }
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(StorefrontConfig::from_lookup(lookup(&[("OSHOP_API_URL", "not a url")])).is_err());
        assert!(StorefrontConfig::from_lookup(lookup(&[("OSHOP_API_URL", "ftp://host/")])).is_err());
    }

    #[test]
    fn test_parse_api_url_checks_scheme() {
        assert_eq!(
            parse_api_url("https://shop.example.com").unwrap().as_str(),
            "https://shop.example.com/"
        );
        let err = parse_api_url("ftp://host/").unwrap_err();
        assert_eq!(err.to_string(), "Invalid API URL 'ftp://host/': unsupported scheme 'ftp'");
        assert!(matches!(parse_api_url("file:///etc/passwd"), Err(ConfigError::InvalidApiUrl(..))));
    }

    #[test]
    fn test_empty_sentry_dsn_is_ignored() {
        let config = StorefrontConfig::from_lookup(lookup(&[("SENTRY_DSN", "")])).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
