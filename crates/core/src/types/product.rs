//! Hardware listings.
//!
//! Field names follow the marketplace API's camelCase JSON. Listings are
//! treated as immutable snapshots by the storefront: the cart and wishlist
//! store whole copies and never patch them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};
use super::price::format_amount;

/// Default shipping option for new listings.
pub const DEFAULT_SHIPPING_OPTION: &str = "local pickup";

/// Default status for new listings.
pub const DEFAULT_LISTING_STATUS: &str = "available";

/// Where a listed item is located.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
}

/// A listing as returned by the marketplace API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    /// Category display name (e.g. "GPUs").
    pub category: String,
    pub subcategory: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub condition: String,
    pub images: Vec<String>,
    pub seller_id: UserId,
    pub seller_name: String,
    pub location: Location,
    pub status: String,
    pub specifications: String,
    pub years_used: u32,
    pub negotiable: bool,
    pub shipping_options: Vec<String>,
    #[serde(with = "super::timestamp::option")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    pub views: u64,
}

impl Product {
    /// First image, used as the card thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Price formatted for display, e.g. `BDT 12,500`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_amount(&self.currency, self.price)
    }
}

/// Payload for creating a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub condition: String,
    pub images: Vec<String>,
    pub seller_id: UserId,
    pub seller_name: String,
    pub location: Location,
    pub status: String,
    pub specifications: String,
    pub years_used: u32,
    pub negotiable: bool,
    pub shipping_options: Vec<String>,
}

/// Partial update for a listing. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_options: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Whether the update carries no fields (the API rejects these).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_parses_api_payload() {
        let json = r#"{
            "productId": "p1",
            "name": "RTX 3080",
            "category": "GPUs",
            "subcategory": "NVIDIA",
            "description": "Barely used, never mined",
            "price": 500.5,
            "currency": "USD",
            "condition": "Excellent",
            "images": ["https://img/1.png"],
            "sellerId": "seller-1",
            "sellerName": "Rafi",
            "location": {"city": "Dhaka", "country": "Bangladesh"},
            "status": "available",
            "specifications": "",
            "yearsUsed": 1,
            "negotiable": true,
            "shippingOptions": ["local pickup"],
            "postedAt": "2025-01-02T03:04:05.678+00:00",
            "updatedAt": null,
            "views": 12
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_id.as_str(), "p1");
        assert_eq!(product.price, Decimal::new(5005, 1));
        assert!(product.posted_at.is_some());
        assert!(product.updated_at.is_none());
        assert_eq!(product.views, 12);
        assert_eq!(product.thumbnail(), Some("https://img/1.png"));
    }

    #[test]
    fn test_product_tolerates_missing_fields() {
        let product: Product =
            serde_json::from_str(r#"{"productId": "p2", "name": "Ryzen 5", "price": 200}"#)
                .unwrap();
        assert_eq!(product.price, Decimal::new(200, 0));
        assert!(product.images.is_empty());
        assert_eq!(product.views, 0);
    }

    #[test]
    fn test_product_price_serializes_as_number() {
        let product = Product {
            product_id: ProductId::new("p3"),
            price: Decimal::new(250, 0),
            ..Product::default()
        };
        let value = serde_json::to_value(&product).unwrap();
        assert!(value["price"].is_number());
        assert_eq!(value["productId"], "p3");
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = ProductUpdate {
            price: Some(Decimal::new(450, 0)),
            ..ProductUpdate::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"price": 450.0}));
        assert!(!update.is_empty());
        assert!(ProductUpdate::default().is_empty());
    }
}
