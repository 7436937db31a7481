//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod wishlist;

use barely_used_storefront::LoadError;
use barely_used_storefront::api::{ApiClient, ApiError};
use barely_used_storefront::auth::ConfiguredIdentity;

/// API client as configured from the environment.
pub type Client = ApiClient<ConfiguredIdentity>;

/// Turn a failed fetch into the message shown to the user.
trait Loading<T> {
    fn loading(self, what: &str) -> Result<T, LoadError>;
}

impl<T> Loading<T> for Result<T, ApiError> {
    fn loading(self, what: &str) -> Result<T, LoadError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, what, "Fetch failed");
            LoadError::from_api(&e, what)
        })
    }
}
