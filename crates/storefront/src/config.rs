//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BUB_API_URL` - Marketplace REST API base URL (default: `http://localhost:8000`)
//! - `BUB_DATA_DIR` - Directory for persisted cart/wishlist (default: `.bub`)
//! - `BUB_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `BUB_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `BUB_SEARCH_DEBOUNCE_MS` - Search-as-you-type delay (default: 300)
//! - `BUB_SEARCH_MIN_CHARS` - Minimum query length for suggestions (default: 2)
//! - `BUB_SEARCH_MAX_SUGGESTIONS` - Suggestions shown (default: 5)
//! - `BUB_ID_TOKEN` - Bearer token issued by the identity provider
//! - `BUB_USER_ID` - Identity provider UID (required when `BUB_ID_TOKEN` is set)
//! - `BUB_USER_EMAIL` - Signed-in user's email
//! - `BUB_USER_NAME` - Signed-in user's display name
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use barely_used_core::UserId;

use crate::auth::{Anonymous, ConfiguredIdentity, Principal, StaticIdentity};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Marketplace REST API settings
    pub api: ApiConfig,
    /// Directory holding the persisted cart and wishlist
    pub data_dir: PathBuf,
    /// Search-as-you-type settings
    pub search: SearchConfig,
    /// Signed-in user supplied by the identity provider, if any
    pub identity: Option<IdentityConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Marketplace REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are joined onto it
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Lifetime of cached product responses
    pub cache_ttl: Duration,
}

/// Search-as-you-type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Delay after the last keystroke before searching
    pub debounce: Duration,
    /// Minimum trimmed query length that triggers a search
    pub min_chars: usize,
    /// Maximum number of suggestions published
    pub max_suggestions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_chars: 2,
            max_suggestions: 5,
        }
    }
}

/// Identity handed over by the identity provider's login flow.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct IdentityConfig {
    pub user_id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub token: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if
    /// `BUB_ID_TOKEN` is set without `BUB_USER_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("BUB_DATA_DIR", ".bub"));
        let search = SearchConfig::from_env()?;
        let identity = IdentityConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            api,
            data_dir,
            search,
            identity,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Configuration suitable for tests: the given API URL, defaults
    /// elsewhere, nobody signed in.
    #[must_use]
    pub fn for_api(base_url: Url) -> Self {
        Self {
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_secs(10),
                cache_ttl: Duration::from_secs(300),
            },
            data_dir: PathBuf::from(".bub"),
            search: SearchConfig::default(),
            identity: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Build the identity provider described by this configuration.
    #[must_use]
    pub fn identity_provider(&self) -> ConfiguredIdentity {
        self.identity.as_ref().map_or(
            ConfiguredIdentity::Anonymous(Anonymous),
            |identity| {
                ConfiguredIdentity::Static(StaticIdentity::new(
                    Principal {
                        uid: identity.user_id.clone(),
                        email: identity.email.clone(),
                        display_name: identity.display_name.clone(),
                    },
                    identity.token.clone(),
                ))
            },
        )
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("BUB_API_URL", "http://localhost:8000");
        let base_url = parse_base_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("BUB_API_URL".to_string(), e))?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(get_parsed_or_default(
                "BUB_REQUEST_TIMEOUT_SECS",
                10,
            )?),
            cache_ttl: Duration::from_secs(get_parsed_or_default("BUB_CACHE_TTL_SECS", 300)?),
        })
    }
}

impl SearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            debounce: Duration::from_millis(get_parsed_or_default(
                "BUB_SEARCH_DEBOUNCE_MS",
                300,
            )?),
            min_chars: get_parsed_or_default("BUB_SEARCH_MIN_CHARS", defaults.min_chars)?,
            max_suggestions: get_parsed_or_default(
                "BUB_SEARCH_MAX_SUGGESTIONS",
                defaults.max_suggestions,
            )?,
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(token) = get_optional_env("BUB_ID_TOKEN").filter(|t| !t.trim().is_empty())
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            user_id: UserId::new(get_required_env("BUB_USER_ID")?),
            email: get_optional_env("BUB_USER_EMAIL"),
            display_name: get_optional_env("BUB_USER_NAME"),
            token: SecretString::from(token),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an API base URL, ensuring a trailing slash so relative joins keep
/// any path prefix (e.g. `https://host/api/`).
///
/// # Errors
///
/// Returns a description of the problem if `raw` is not an absolute
/// `http` or `https` URL.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://api.example.com/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(url.join("products").unwrap().as_str(), "https://api.example.com/v1/products");

        let url = parse_base_url("http://localhost:8000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_parse_base_url_rejects_bad_input() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://files.example.com").is_err());
    }

    #[test]
    fn test_identity_debug_redacts_token() {
        let identity = IdentityConfig {
            user_id: UserId::new("uid-1"),
            email: None,
            display_name: None,
            token: SecretString::from("super-secret-token"),
        };
        let debug = format!("{identity:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_identity_provider_defaults_to_anonymous() {
        let config = StorefrontConfig::for_api(parse_base_url("http://localhost:8000").unwrap());
        assert!(matches!(
            config.identity_provider(),
            ConfiguredIdentity::Anonymous(_)
        ));
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.debounce, Duration::from_millis(300));
        assert_eq!(search.min_chars, 2);
        assert_eq!(search.max_suggestions, 5);
    }
}
