//! Core types for Barely Used Bytes.
//!
//! This module provides type-safe wrappers for marketplace domain concepts.

pub mod catalog;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod review;
pub mod status;
pub mod timestamp;
pub mod user;

pub use catalog::{CATEGORIES, CONDITIONS, Category};
pub use id::*;
pub use order::{Order, OrderCreate, OrderUpdate, ShippingAddress};
pub use price::{CurrencyCode, UnknownCurrency, format_amount};
pub use product::{
    DEFAULT_LISTING_STATUS, DEFAULT_SHIPPING_OPTION, Location, Product, ProductCreate, ProductUpdate,
};
pub use review::{RatingSummary, Review, ReviewCreate};
pub use status::*;
pub use user::{Address, User, UserCreate, UserUpdate};
