//! Unified error handling.
//!
//! Each concern has its own error enum; `AppError` unifies them for
//! callers that drive several at once (the CLI). `LoadError` is the
//! user-facing classification of a failed fetch.

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::listing::ListingError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Marketplace API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identity provider refused or nobody is signed in.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Listing form failed validation.
    #[error("Invalid listing: {0}")]
    Listing(#[from] ListingError),

    /// Order placement failed.
    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    /// A fetch failed; the message is meant for the user.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// What went wrong loading something, phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The API could not be reached at all.
    #[error("Cannot connect to the server. Make sure the backend is running.")]
    ServerUnreachable,

    /// The requested resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Anything else.
    #[error("Failed to load {0}. Please try again later.")]
    Failed(String),
}

impl LoadError {
    /// Classify an API failure while loading `what` (e.g. "products").
    #[must_use]
    pub fn from_api(err: &ApiError, what: &str) -> Self {
        match err {
            ApiError::Unreachable(_) => Self::ServerUnreachable,
            ApiError::NotFound(_) => Self::NotFound(capitalize(what)),
            _ => Self::Failed(what.to_string()),
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether offering a retry makes sense.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
