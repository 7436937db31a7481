//! Review endpoints. Reads are public; posting a review is authenticated.

use barely_used_core::{Review, ReviewCreate, ReviewId};
use reqwest::Method;
use tracing::instrument;

use super::client::Access;
use super::products::encode_segment;
use super::{ApiClient, ApiError};
use crate::auth::IdentityProvider;

impl<I: IdentityProvider> ApiClient<I> {
    /// Get every review.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_reviews(&self) -> Result<Vec<Review>, ApiError> {
        let request = self.request(Method::GET, "reviews", Access::Public).await?;
        self.send_json(request).await
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the review does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn get_review(&self, review_id: &ReviewId) -> Result<Review, ApiError> {
        let path = format!("reviews/{}", encode_segment(review_id.as_str()));
        let request = self.request(Method::GET, &path, Access::Public).await?;
        self.send_json(request).await
    }

    /// Reviews left for a seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn reviews_for_seller(&self, seller_id: &str) -> Result<Vec<Review>, ApiError> {
        let reviews = self.list_reviews().await?;
        Ok(reviews
            .into_iter()
            .filter(|r| r.seller_id.as_str() == seller_id)
            .collect())
    }

    /// Reviews left on a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn reviews_for_product(&self, product_id: &str) -> Result<Vec<Review>, ApiError> {
        let reviews = self.list_reviews().await?;
        Ok(reviews
            .into_iter()
            .filter(|r| r.product_id.as_str() == product_id)
            .collect())
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the review or the request fails.
    #[instrument(skip(self, review), fields(order_id = %review.order_id))]
    pub async fn create_review(&self, review: &ReviewCreate) -> Result<Review, ApiError> {
        let request = self
            .request(Method::POST, "reviews", Access::Authenticated)
            .await?
            .json(review);
        self.send_json(request).await
    }
}
