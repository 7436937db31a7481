//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, error_detail};
use crate::auth::{Anonymous, IdentityProvider};
use crate::config::ApiConfig;

/// Whether a request should carry the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
    Public,
    Authenticated,
}

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the connection pool and the cache.
pub struct ApiClient<I = Anonymous> {
    inner: Arc<ApiClientInner<I>>,
}

struct ApiClientInner<I> {
    client: reqwest::Client,
    base_url: Url,
    identity: I,
    cache: Cache<CacheKey, CacheValue>,
}

impl<I> Clone for ApiClient<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I> std::fmt::Debug for ApiClient<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl<I: IdentityProvider> ApiClient<I> {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, identity: I) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                identity,
                cache,
            }),
        })
    }

    /// The identity provider used for authenticated calls.
    #[must_use]
    pub fn identity(&self) -> &I {
        &self.inner.identity
    }

    /// Base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(super) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Build a request for `path` (relative, no leading slash).
    pub(super) async fn request(
        &self,
        method: Method,
        path: &str,
        access: Access,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let mut builder = self.inner.client.request(method, url);

        if access == Access::Authenticated {
            // Signed-out callers still go through; the API decides.
            if let Some(token) = self.inner.identity.id_token().await? {
                builder = builder.bearer_auth(token.expose_secret());
            }
        }

        Ok(builder)
    }

    /// Send a request and decode a JSON body.
    pub(super) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and discard the body.
    pub(super) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if status.is_success() {
            debug!(%status, %url, "API request succeeded");
            return Ok(body);
        }

        let detail = error_detail(status, &body);
        if status == StatusCode::NOT_FOUND {
            debug!(%url, %detail, "API resource not found");
            return Err(ApiError::NotFound(detail));
        }

        tracing::warn!(
            %status,
            %url,
            body = %body.chars().take(500).collect::<String>(),
            "API returned non-success status"
        );
        Err(ApiError::Status { status, detail })
    }
}
