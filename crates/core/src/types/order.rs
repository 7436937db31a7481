//! Orders placed against listings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, ReviewId, UserId};
use super::status::{OrderStatus, PaymentStatus};

/// Delivery address for an order. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

/// Payload for placing an order for a single listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub currency: String,
    pub order_status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_notes: Option<String>,
}

/// An order as returned by the marketplace API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub shipping_tracking_number: Option<String>,
    #[serde(default)]
    pub seller_notes: Option<String>,
    #[serde(default)]
    pub buyer_notes: Option<String>,
    #[serde(default)]
    pub review_id: Option<ReviewId>,
    #[serde(with = "super::timestamp")]
    pub ordered_at: DateTime<Utc>,
    #[serde(default, with = "super::timestamp::option")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp::option")]
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Partial order update (status changes, tracking, notes).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<ReviewId>,
}
