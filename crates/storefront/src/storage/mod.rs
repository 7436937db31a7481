//! Client-side persistent key-value storage.
//!
//! The storefront persists exactly two slots, one per store, each holding the
//! JSON form of the whole collection. Reads happen once per session and
//! writes overwrite the slot wholesale, so the surface is a plain synchronous
//! string map.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, used by tests and ephemeral sessions
//! - [`FileStore`] - one file per key under a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "bub_cart";

/// Storage slot holding the serialized wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "bub_wishlist";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters the backend cannot represent.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend is unusable (e.g. a poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string-keyed storage surface.
///
/// Implementations must be safe to share between threads; the stores only
/// ever write from one logical writer, and concurrent writers across
/// processes resolve as last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
