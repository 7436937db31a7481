//! Browsing and search.

use barely_used_core::{Category, ProductId};
use barely_used_storefront::AppError;
use barely_used_storefront::catalog::{CatalogQuery, SearchFields, available_categories};
use barely_used_storefront::config::StorefrontConfig;
use barely_used_storefront::search::SearchSuggester;
use tracing::warn;

use super::{Client, Loading};
use crate::output;

/// Filtered, sorted view of every listing.
pub async fn list(client: &Client, query: &CatalogQuery) -> Result<(), AppError> {
    let products = client.list_products().await.loading("products")?;
    output::products(&query.apply(&products));
    Ok(())
}

/// One category's listings; the text filter skips the category field.
pub async fn category(client: &Client, slug: &str, mut query: CatalogQuery) -> Result<(), AppError> {
    let category =
        Category::by_slug(slug).ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;
    let products = client
        .products_by_category(category.name)
        .await
        .loading("products")?;

    query.fields = SearchFields::CATEGORY_PAGE;
    output::heading(category.name);
    output::products(&query.apply(&products));
    Ok(())
}

/// One listing with its reviews. A failed review fetch still shows the listing.
pub async fn show(client: &Client, id: &str) -> Result<(), AppError> {
    let product = client
        .get_product(&ProductId::new(id))
        .await
        .loading("product")?;
    let reviews = client
        .reviews_for_product(product.product_id.as_str())
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, product_id = %product.product_id, "Failed to load reviews");
            Vec::new()
        });
    output::product_detail(&product, &reviews);
    Ok(())
}

pub async fn categories(client: &Client) -> Result<(), AppError> {
    let products = client.list_products().await.loading("products")?;
    output::lines(available_categories(&products));
    Ok(())
}

/// Run the query through the debounced suggester and print what it settles on.
pub async fn search(client: &Client, config: &StorefrontConfig, query: &str) -> Result<(), AppError> {
    let mut suggester = SearchSuggester::new(client.clone(), config.search);
    let mut rx = suggester.subscribe();
    suggester.input(query);

    let suggestions = rx
        .wait_for(|s| !s.searching)
        .await
        .map_err(|_| AppError::Internal("search suggestions closed".to_string()))?
        .clone();

    if suggestions.query.chars().count() < config.search.min_chars {
        output::message(&format!(
            "Type at least {} characters to search.",
            config.search.min_chars
        ));
    } else {
        output::suggestions(&suggestions);
    }
    Ok(())
}
