//! Order endpoints. All of them are authenticated.

use barely_used_core::{Order, OrderCreate, OrderId, OrderUpdate};
use reqwest::Method;
use tracing::instrument;

use super::client::Access;
use super::products::encode_segment;
use super::{ApiClient, ApiError};
use crate::auth::IdentityProvider;

impl<I: IdentityProvider> ApiClient<I> {
    /// Get the orders visible to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self
            .request(Method::GET, "orders", Access::Authenticated)
            .await?;
        self.send_json(request).await
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let path = format!("orders/{}", encode_segment(order_id.as_str()));
        let request = self.request(Method::GET, &path, Access::Authenticated).await?;
        self.send_json(request).await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, order), fields(product_id = %order.product_id))]
    pub async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
        let request = self
            .request(Method::POST, "orders", Access::Authenticated)
            .await?
            .json(order);
        self.send_json(request).await
    }

    /// Apply a partial update to an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, the update is rejected,
    /// or the request fails.
    #[instrument(skip(self, update), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, ApiError> {
        let path = format!("orders/{}", encode_segment(order_id.as_str()));
        let request = self
            .request(Method::PUT, &path, Access::Authenticated)
            .await?
            .json(update);
        self.send_json(request).await
    }
}
