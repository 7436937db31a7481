//! Profile endpoints. All of them are authenticated.

use barely_used_core::{User, UserCreate, UserId, UserUpdate};
use reqwest::Method;
use tracing::instrument;

use super::client::Access;
use super::products::encode_segment;
use super::{ApiClient, ApiError};
use crate::auth::IdentityProvider;

impl<I: IdentityProvider> ApiClient<I> {
    /// Get a profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the profile does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: &UserId) -> Result<User, ApiError> {
        let path = format!("users/{}", encode_segment(user_id.as_str()));
        let request = self.request(Method::GET, &path, Access::Authenticated).await?;
        self.send_json(request).await
    }

    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the profile or the request fails.
    #[instrument(skip(self, user))]
    pub async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError> {
        let request = self
            .request(Method::POST, "users", Access::Authenticated)
            .await?
            .json(user);
        self.send_json(request).await
    }

    /// Apply a partial update to a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist, the update is
    /// rejected, or the request fails.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_user(&self, user_id: &UserId, update: &UserUpdate) -> Result<User, ApiError> {
        let path = format!("users/{}", encode_segment(user_id.as_str()));
        let request = self
            .request(Method::PUT, &path, Access::Authenticated)
            .await?
            .json(update);
        self.send_json(request).await
    }
}
