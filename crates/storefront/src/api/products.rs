//! Listing endpoints.

use std::sync::Arc;

use barely_used_core::{Product, ProductCreate, ProductId, ProductUpdate};
use reqwest::Method;
use tracing::{debug, instrument};

use super::ApiClient;
use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::client::Access;
use crate::auth::IdentityProvider;
use crate::catalog::{SearchFields, matches_query};

impl<I: IdentityProvider> ApiClient<I> {
    /// Get every listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cache().get(&CacheKey::Products).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let request = self.request(Method::GET, "products", Access::Public).await?;
        let products: Arc<Vec<Product>> = Arc::new(self.send_json(request).await?);

        self.cache()
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the listing does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(product_id.clone());
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("products/{}", encode_segment(product_id.as_str()));
        let request = self.request(Method::GET, &path, Access::Public).await?;
        let product: Product = self.send_json(request).await?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Listings whose category equals `category`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        let products = self.list_products().await?;
        let category = category.to_lowercase();
        Ok(products
            .iter()
            .filter(|p| p.category.to_lowercase() == category)
            .cloned()
            .collect())
    }

    /// Listings matching `query` in name, description, category or
    /// subcategory (case-insensitive substring).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let products = self.list_products().await?;
        let needle = query.to_lowercase();
        Ok(products
            .iter()
            .filter(|p| matches_query(p, &needle, SearchFields::API_SEARCH))
            .cloned()
            .collect())
    }

    /// Create a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the listing or the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &ProductCreate) -> Result<Product, ApiError> {
        let request = self
            .request(Method::POST, "products", Access::Authenticated)
            .await?
            .json(product);
        let created: Product = self.send_json(request).await?;

        self.cache().invalidate(&CacheKey::Products).await;
        Ok(created)
    }

    /// Apply a partial update to a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist, the update is
    /// rejected, or the request fails.
    #[instrument(skip(self, update), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        let path = format!("products/{}", encode_segment(product_id.as_str()));
        let request = self
            .request(Method::PUT, &path, Access::Authenticated)
            .await?
            .json(update);
        let updated: Product = self.send_json(request).await?;

        self.invalidate_product(product_id).await;
        Ok(updated)
    }

    /// Delete a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let path = format!("products/{}", encode_segment(product_id.as_str()));
        let request = self
            .request(Method::DELETE, &path, Access::Authenticated)
            .await?;
        self.send_empty(request).await?;

        self.invalidate_product(product_id).await;
        Ok(())
    }

    async fn invalidate_product(&self, product_id: &ProductId) {
        self.cache().invalidate(&CacheKey::Products).await;
        self.cache()
            .invalidate(&CacheKey::Product(product_id.clone()))
            .await;
    }
}

/// Percent-encode an id for use as a single path segment.
pub(super) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
