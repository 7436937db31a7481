//! Create and edit listing drafts.
//!
//! A [`ListingDraft`] is the state of the listing form. The category is
//! held as a slug while editing and converted to its display name when
//! the draft is submitted.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use barely_used_core::{
    CurrencyCode, Category, DEFAULT_LISTING_STATUS, DEFAULT_SHIPPING_OPTION, Location, Product,
    ProductCreate, ProductId, ProductUpdate, UserId,
};

use crate::api::ApiClient;
use crate::auth::{AuthError, IdentityProvider, Principal, require_principal};

/// Country prefilled on new listings.
pub const DEFAULT_COUNTRY: &str = "Bangladesh";

const MIN_NAME_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

/// Listing form validation failures, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("Product name must be at least 3 characters.")]
    NameTooShort,
    #[error("Please select a category and subcategory.")]
    MissingCategory,
    #[error("Description must be at least 10 characters.")]
    DescriptionTooShort,
    #[error("Please enter a valid price.")]
    InvalidPrice,
    #[error("Please select a condition.")]
    MissingCondition,
    #[error("Please add at least one image.")]
    NoImages,
    #[error("Please enter your city.")]
    MissingCity,
}

/// Listing form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub name: String,
    /// Category slug, e.g. `gpu`.
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub currency: CurrencyCode,
    pub condition: String,
    pub specifications: String,
    pub years_used: u32,
    pub negotiable: bool,
    pub city: String,
    pub country: String,
    pub status: String,
    shipping_options: Vec<String>,
    images: Vec<String>,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            subcategory: String::new(),
            description: String::new(),
            price: None,
            currency: CurrencyCode::default(),
            condition: String::new(),
            specifications: String::new(),
            years_used: 0,
            negotiable: false,
            city: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            status: DEFAULT_LISTING_STATUS.to_string(),
            shipping_options: vec![DEFAULT_SHIPPING_OPTION.to_string()],
            images: Vec::new(),
        }
    }
}

impl ListingDraft {
    /// An empty form with the usual defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill the edit form from an existing listing.
    ///
    /// Categories that no longer exist leave the selection empty.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: Category::by_name(&product.category)
                .map(|c| c.slug.to_string())
                .unwrap_or_default(),
            subcategory: product.subcategory.clone(),
            description: product.description.clone(),
            price: Some(product.price),
            currency: product.currency.parse().unwrap_or_default(),
            condition: product.condition.clone(),
            specifications: product.specifications.clone(),
            years_used: product.years_used,
            negotiable: product.negotiable,
            city: product.location.city.clone(),
            country: product.location.country.clone(),
            status: product.status.clone(),
            shipping_options: product.shipping_options.clone(),
            images: product.images.clone(),
        }
    }

    /// Image URLs in display order.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Add an image URL. Blank and duplicate URLs are ignored.
    ///
    /// Returns whether the URL was added.
    pub fn add_image(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || self.images.iter().any(|i| i == url) {
            return false;
        }
        self.images.push(url.to_string());
        true
    }

    /// Remove the image at `index`, if present.
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Selected shipping options.
    #[must_use]
    pub fn shipping_options(&self) -> &[String] {
        &self.shipping_options
    }

    /// Toggle a shipping option. The last remaining option cannot be
    /// deselected.
    pub fn toggle_shipping(&mut self, option: &str) {
        if let Some(pos) = self.shipping_options.iter().position(|o| o == option) {
            if self.shipping_options.len() > 1 {
                self.shipping_options.remove(pos);
            }
        } else {
            self.shipping_options.push(option.to_string());
        }
    }

    /// Selected category, if the slug is known.
    #[must_use]
    pub fn selected_category(&self) -> Option<&'static Category> {
        Category::by_slug(&self.category)
    }

    /// Check the form, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns the first [`ListingError`] in form order.
    pub fn validate(&self) -> Result<(), ListingError> {
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(ListingError::NameTooShort);
        }
        if self.selected_category().is_none() || self.subcategory.trim().is_empty() {
            return Err(ListingError::MissingCategory);
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(ListingError::DescriptionTooShort);
        }
        if self.price.is_none_or(|p| p <= Decimal::ZERO) {
            return Err(ListingError::InvalidPrice);
        }
        if self.condition.trim().is_empty() {
            return Err(ListingError::MissingCondition);
        }
        if self.images.is_empty() {
            return Err(ListingError::NoImages);
        }
        if self.city.trim().is_empty() {
            return Err(ListingError::MissingCity);
        }
        Ok(())
    }

    fn category_name(&self) -> String {
        self.selected_category()
            .map_or_else(|| self.category.clone(), |c| c.name.to_string())
    }

    fn location(&self) -> Location {
        Location {
            city: self.city.trim().to_string(),
            country: self.country.clone(),
        }
    }

    /// Build the create payload for `seller`.
    ///
    /// # Errors
    ///
    /// Returns a [`ListingError`] if the form is incomplete.
    pub fn to_create(&self, seller: &Principal) -> Result<ProductCreate, ListingError> {
        self.validate()?;
        Ok(ProductCreate {
            name: self.name.trim().to_string(),
            category: self.category_name(),
            subcategory: self.subcategory.clone(),
            description: self.description.trim().to_string(),
            price: self.price.unwrap_or_default(),
            currency: self.currency.code().to_string(),
            condition: self.condition.clone(),
            images: self.images.clone(),
            seller_id: seller.uid.clone(),
            seller_name: seller.display_name_or_fallback(),
            location: self.location(),
            status: self.status.clone(),
            specifications: self.specifications.trim().to_string(),
            years_used: self.years_used,
            negotiable: self.negotiable,
            shipping_options: self.shipping_options.clone(),
        })
    }

    /// Build the update payload. Every form field is sent.
    ///
    /// # Errors
    ///
    /// Returns a [`ListingError`] if the form is incomplete.
    pub fn to_update(&self) -> Result<ProductUpdate, ListingError> {
        self.validate()?;
        Ok(ProductUpdate {
            name: Some(self.name.trim().to_string()),
            category: Some(self.category_name()),
            subcategory: Some(self.subcategory.clone()),
            description: Some(self.description.trim().to_string()),
            price: self.price,
            currency: Some(self.currency.code().to_string()),
            condition: Some(self.condition.clone()),
            images: Some(self.images.clone()),
            location: Some(self.location()),
            status: Some(self.status.clone()),
            specifications: Some(self.specifications.trim().to_string()),
            years_used: Some(self.years_used),
            negotiable: Some(self.negotiable),
            shipping_options: Some(self.shipping_options.clone()),
        })
    }
}

/// Reject edits to a listing the principal does not own.
///
/// # Errors
///
/// Returns [`AuthError::Forbidden`] if `principal` is not the seller.
pub fn ensure_owner(product: &Product, principal: &Principal) -> Result<(), AuthError> {
    if product.seller_id == principal.uid {
        Ok(())
    } else {
        Err(AuthError::Forbidden("edit this listing".to_string()))
    }
}

/// Publish a new listing as the signed-in user.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the draft is invalid, or the
/// API rejects it.
#[instrument(skip_all)]
pub async fn publish<I: IdentityProvider>(
    client: &ApiClient<I>,
    draft: &ListingDraft,
) -> crate::error::Result<Product> {
    let seller = require_principal(client.identity())?;
    let payload = draft.to_create(&seller)?;
    let product = client.create_product(&payload).await?;
    info!(product_id = %product.product_id, "Listing published");
    Ok(product)
}

/// Save edits to a listing owned by the signed-in user.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the user does not own the
/// listing, the draft is invalid, or the API rejects it.
#[instrument(skip_all, fields(product_id = %product_id))]
pub async fn save_edits<I: IdentityProvider>(
    client: &ApiClient<I>,
    product_id: &ProductId,
    draft: &ListingDraft,
) -> crate::error::Result<Product> {
    let principal = require_principal(client.identity())?;
    let existing = client.get_product(product_id).await?;
    ensure_owner(&existing, &principal)?;
    let update = draft.to_update()?;
    Ok(client.update_product(product_id, &update).await?)
}

/// Delete a listing owned by the signed-in user.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the user does not own the
/// listing, or the API call fails.
#[instrument(skip_all, fields(product_id = %product_id))]
pub async fn delete<I: IdentityProvider>(
    client: &ApiClient<I>,
    product_id: &ProductId,
) -> crate::error::Result<()> {
    let principal = require_principal(client.identity())?;
    let existing = client.get_product(product_id).await?;
    ensure_owner(&existing, &principal)?;
    client.delete_product(product_id).await?;
    info!("Listing deleted");
    Ok(())
}

/// Listings posted by `seller`, in API order.
#[must_use]
pub fn owned_by(products: &[Product], seller: &UserId) -> Vec<Product> {
    products
        .iter()
        .filter(|p| &p.seller_id == seller)
        .cloned()
        .collect()
}

/// The signed-in user's own listings.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the product list cannot be
/// loaded.
#[instrument(skip_all)]
pub async fn my_listings<I: IdentityProvider>(
    client: &ApiClient<I>,
) -> crate::error::Result<Vec<Product>> {
    let principal = require_principal(client.identity())?;
    let products = client.list_products().await?;
    Ok(owned_by(&products, &principal.uid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> ListingDraft {
        let mut draft = ListingDraft::new();
        draft.name = "  RTX 3080  ".to_string();
        draft.category = "gpu".to_string();
        draft.subcategory = "NVIDIA".to_string();
        draft.description = "Barely used, never mined".to_string();
        draft.price = Some(Decimal::new(55_000, 0));
        draft.condition = "Excellent".to_string();
        draft.city = "Dhaka".to_string();
        draft.add_image("https://img/1.png");
        draft
    }

    fn seller() -> Principal {
        Principal {
            uid: UserId::new("seller-1"),
            email: Some("rafi@example.com".to_string()),
            display_name: None,
        }
    }

    #[test]
    fn test_defaults() {
        let draft = ListingDraft::new();
        assert_eq!(draft.currency, CurrencyCode::BDT);
        assert_eq!(draft.country, "Bangladesh");
        assert_eq!(draft.status, "available");
        assert_eq!(draft.shipping_options(), ["local pickup"]);
    }

    #[test]
    fn test_validation_order() {
        let mut draft = complete_draft();
        assert_eq!(draft.validate(), Ok(()));

        draft.city = " ".to_string();
        assert_eq!(draft.validate(), Err(ListingError::MissingCity));

        draft.remove_image(0);
        assert_eq!(draft.validate(), Err(ListingError::NoImages));

        draft.price = Some(Decimal::ZERO);
        assert_eq!(draft.validate(), Err(ListingError::InvalidPrice));

        draft.description = "short".to_string();
        assert_eq!(draft.validate(), Err(ListingError::DescriptionTooShort));

        draft.subcategory.clear();
        assert_eq!(draft.validate(), Err(ListingError::MissingCategory));

        draft.name = "ab".to_string();
        assert_eq!(draft.validate(), Err(ListingError::NameTooShort));
    }

    #[test]
    fn test_missing_condition() {
        let mut draft = complete_draft();
        draft.condition.clear();
        assert_eq!(draft.validate(), Err(ListingError::MissingCondition));
    }

    #[test]
    fn test_unknown_category_slug_is_missing() {
        let mut draft = complete_draft();
        draft.category = "toaster".to_string();
        assert_eq!(draft.validate(), Err(ListingError::MissingCategory));
    }

    #[test]
    fn test_images_are_trimmed_and_deduplicated() {
        let mut draft = ListingDraft::new();
        assert!(draft.add_image(" https://img/a.png "));
        assert!(!draft.add_image("https://img/a.png"));
        assert!(!draft.add_image("   "));
        assert_eq!(draft.images(), ["https://img/a.png"]);
        assert_eq!(draft.remove_image(5), None);
    }

    #[test]
    fn test_shipping_toggle_keeps_one_option() {
        let mut draft = ListingDraft::new();
        draft.toggle_shipping("local pickup");
        assert_eq!(draft.shipping_options(), ["local pickup"]);

        draft.toggle_shipping("courier");
        draft.toggle_shipping("local pickup");
        assert_eq!(draft.shipping_options(), ["courier"]);
    }

    #[test]
    fn test_to_create_maps_category_and_seller() {
        let create = complete_draft().to_create(&seller()).unwrap();
        assert_eq!(create.name, "RTX 3080");
        assert_eq!(create.category, "GPUs");
        assert_eq!(create.currency, "BDT");
        assert_eq!(create.seller_name, "rafi");
        assert_eq!(create.location.country, "Bangladesh");
    }

    #[test]
    fn test_from_product_round_trip() {
        let create = complete_draft().to_create(&seller()).unwrap();
        let product = Product {
            product_id: ProductId::new("p1"),
            name: create.name,
            category: create.category,
            subcategory: create.subcategory,
            description: create.description,
            price: create.price,
            currency: "usd".to_string(),
            condition: create.condition,
            images: create.images,
            seller_id: create.seller_id,
            location: create.location,
            status: create.status,
            shipping_options: create.shipping_options,
            ..Product::default()
        };

        let draft = ListingDraft::from_product(&product);
        assert_eq!(draft.category, "gpu");
        assert_eq!(draft.currency, CurrencyCode::USD);
        let update = draft.to_update().unwrap();
        assert_eq!(update.category.as_deref(), Some("GPUs"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_ensure_owner() {
        let product = Product {
            seller_id: UserId::new("seller-1"),
            ..Product::default()
        };
        assert!(ensure_owner(&product, &seller()).is_ok());

        let other = Principal {
            uid: UserId::new("someone-else"),
            email: None,
            display_name: None,
        };
        let err = ensure_owner(&product, &other).unwrap_err();
        assert_eq!(err.to_string(), "You don't have permission to edit this listing");
    }

    #[test]
    fn test_owned_by_filters_on_seller() {
        let listing = |id: &str, seller: &str| Product {
            product_id: ProductId::new(id),
            seller_id: UserId::new(seller),
            ..Product::default()
        };
        let products = [listing("p1", "alice"), listing("p2", "bob"), listing("p3", "alice")];

        let mine = owned_by(&products, &UserId::new("alice"));
        let ids: Vec<_> = mine.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, ["p1", "p3"]);
        assert!(owned_by(&products, &UserId::new("carol")).is_empty());
    }
}
