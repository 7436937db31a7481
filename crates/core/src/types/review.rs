//! Seller and product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, ReviewId, UserId};

/// Payload for reviewing a completed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub reviewer_id: UserId,
    pub order_id: OrderId,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub product_name: String,
    pub seller_name: String,
    pub reviewer_name: String,
}

/// A review as returned by the marketplace API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub reviewer_id: UserId,
    pub order_id: OrderId,
    pub rating: u8,
    pub comment: String,
    pub product_name: String,
    pub seller_name: String,
    pub reviewer_name: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub helpful_votes: u32,
    #[serde(with = "super::timestamp")]
    pub reviewed_at: DateTime<Utc>,
}

/// Star rating summary shown alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub count: usize,
    /// Mean stars, `0.0` when there are no reviews.
    pub average: f64,
}

impl RatingSummary {
    #[must_use]
    pub fn of(reviews: &[Review]) -> Self {
        let count = reviews.len();
        if count == 0 {
            return Self { count, average: 0.0 };
        }
        let stars: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = f64::from(stars) / count as f64;
        Self { count, average }
    }

    /// Average to one decimal place, e.g. `"4.5"`.
    #[must_use]
    pub fn display_average(&self) -> String {
        format!("{:.1}", self.average)
    }
}
