//! Barely Used Bytes storefront library.
//!
//! Everything a storefront front end needs on the client side: the
//! session-scoped cart and wishlist persisted to local storage, the
//! filter/sort pipeline over the product list, the marketplace API client,
//! debounced search, listing drafts and checkout.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod listing;
pub mod search;
pub mod session;
pub mod storage;
pub mod stores;

pub use error::{AppError, LoadError, Result};
pub use session::Session;
