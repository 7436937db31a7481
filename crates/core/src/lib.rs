//! Barely Used Bytes Core - Shared marketplace types.
//!
//! This crate provides the value types exchanged with the marketplace REST API
//! and shared by the storefront library and the `bub` CLI:
//! - Listings (`Product`, `ProductCreate`, `ProductUpdate`)
//! - Accounts, orders and reviews
//! - The fixed category and condition catalog used by listing forms
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, listings, users, orders, reviews, catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
