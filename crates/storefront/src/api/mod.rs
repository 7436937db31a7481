//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; the API is a FastAPI service
//! - The API is the source of truth for listings, profiles, orders and
//!   reviews - NO local sync beyond the cart and wishlist snapshots
//! - Authenticated calls carry a bearer token fetched on demand from the
//!   [`IdentityProvider`](crate::auth::IdentityProvider)
//! - Product list and detail responses are cached in-memory via `moka`
//!   and invalidated by listing mutations
//!
//! The API has no server-side filtering, so category, search and review
//! lookups fetch the full collection and filter client-side.
//!
//! # Example
//!
//! ```rust,ignore
//! use barely_used_storefront::api::ApiClient;
//! use barely_used_storefront::auth::Anonymous;
//!
//! let client = ApiClient::new(&config.api, Anonymous)?;
//! let gpus = client.products_by_category("GPUs").await?;
//! let detail = client.get_product(&gpus[0].product_id).await?;
//! ```

mod cache;
mod client;
mod orders;
mod products;
mod reviews;
mod users;

pub use client::ApiClient;

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached (connection refused, DNS, timeout).
    #[error("Server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{detail}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// `detail` from the error body, or a generic status message.
        detail: String,
    },

    /// The resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Could not obtain a bearer token.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unreachable(err)
        } else {
            Self::Transport(err)
        }
    }
}

impl ApiError {
    /// Whether the failure means the server could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// HTTP status returned by the server, if the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

/// Extract the error message from a FastAPI error body.
///
/// FastAPI puts a string in `detail` for `HTTPException` and a list of
/// objects for validation errors; the latter is rendered as compact JSON.
/// Bodies without a usable `detail` fall back to the status code.
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|detail| match detail {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_string() {
        let detail = error_detail(StatusCode::NOT_FOUND, r#"{"detail": "Product not found"}"#);
        assert_eq!(detail, "Product not found");
    }

    #[test]
    fn test_error_detail_validation_list() {
        let detail = error_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "price"], "msg": "must be > 0"}]}"#,
        );
        assert!(detail.contains("must be > 0"));
    }

    #[test]
    fn test_error_detail_fallback() {
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "HTTP error! status: 502"
        );
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, "{}"),
            "HTTP error! status: 500"
        );
    }

    #[test]
    fn test_status_display_is_detail() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            detail: "No fields provided for update".to_string(),
        };
        assert_eq!(err.to_string(), "No fields provided for update");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_unreachable());
    }
}
