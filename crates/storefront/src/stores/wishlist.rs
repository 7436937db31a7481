//! Bookmarked listings.

use std::collections::HashSet;
use std::sync::Arc;

use barely_used_core::Product;

use super::observer::SubscriptionId;
use super::synced::SyncedCollection;
use crate::storage::{KeyValueStore, StorageError, WISHLIST_STORAGE_KEY};

/// The wishlist: product snapshots with at most one entry per id.
#[derive(Debug)]
pub struct WishlistStore {
    inner: SyncedCollection<Product>,
}

impl WishlistStore {
    /// Open the wishlist bound to [`WISHLIST_STORAGE_KEY`] and hydrate it.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut wishlist = Self::new(storage);
        wishlist.hydrate();
        wishlist
    }

    /// Create an unhydrated wishlist.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: SyncedCollection::new(storage, WISHLIST_STORAGE_KEY)
                .with_normalizer(drop_duplicates),
        }
    }

    /// Load the stored wishlist (once).
    pub fn hydrate(&mut self) {
        self.inner.hydrate();
    }

    /// Bookmark a product. Adding an id that is already present is a no-op.
    pub fn add_to_wishlist(&mut self, product: &Product) {
        self.inner.mutate(|items| {
            if items.iter().any(|p| p.product_id == product.product_id) {
                return false;
            }
            items.push(product.clone());
            true
        });
    }

    /// Remove the entry for `product_id`. Absent ids are a no-op.
    pub fn remove_from_wishlist(&mut self, product_id: &str) {
        self.inner.mutate(|items| {
            let before = items.len();
            items.retain(|p| p.product_id.as_str() != product_id);
            items.len() != before
        });
    }

    /// Add if absent, remove if present. Returns whether the product is
    /// bookmarked afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.is_in_wishlist(product.product_id.as_str()) {
            self.remove_from_wishlist(product.product_id.as_str());
            false
        } else {
            self.add_to_wishlist(product);
            true
        }
    }

    /// Whether `product_id` is bookmarked.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &str) -> bool {
        self.inner
            .items()
            .iter()
            .any(|p| p.product_id.as_str() == product_id)
    }

    /// Empty the wishlist.
    pub fn clear_wishlist(&mut self) {
        self.inner.mutate(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        });
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        self.inner.items()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items().len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items().is_empty()
    }

    /// Whether the wishlist has been hydrated.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.inner.is_hydrated()
    }

    /// JSON form of the wishlist as written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<String, StorageError> {
        self.inner.serialize()
    }

    /// Retry a failed write-back.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the retry fails.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.inner.flush()
    }

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Product]) + Send + Sync + 'static,
    {
        self.inner.subscribe(callback)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }
}

/// Keep the first entry for each product id.
fn drop_duplicates(items: &mut Vec<Product>) -> bool {
    let before = items.len();
    let mut seen = HashSet::new();
    items.retain(|p| seen.insert(p.product_id.clone()));
    items.len() != before
}

#[cfg(test)]
mod tests {
    use barely_used_core::ProductId;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: &str) -> Product {
        Product {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            ..Product::default()
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = WishlistStore::open(Arc::new(MemoryStore::new()));
        let p = product("a");

        wishlist.add_to_wishlist(&p);
        wishlist.add_to_wishlist(&p);

        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.is_in_wishlist("a"));
        assert!(!wishlist.is_in_wishlist("b"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut wishlist = WishlistStore::open(Arc::new(MemoryStore::new()));
        wishlist.add_to_wishlist(&product("a"));
        wishlist.add_to_wishlist(&product("b"));
        wishlist.add_to_wishlist(&product("c"));

        wishlist.remove_from_wishlist("b");
        wishlist.remove_from_wishlist("nope");
        let ids: Vec<_> = wishlist.items().iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        wishlist.clear_wishlist();
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut wishlist = WishlistStore::open(Arc::new(MemoryStore::new()));
        let p = product("a");
        assert!(wishlist.toggle(&p));
        assert!(!wishlist.toggle(&p));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_persists_and_rehydrates() {
        let storage = Arc::new(MemoryStore::new());
        let mut wishlist = WishlistStore::open(storage.clone());
        wishlist.add_to_wishlist(&product("a"));
        wishlist.add_to_wishlist(&product("b"));

        let restored = WishlistStore::open(storage);
        assert_eq!(restored.items(), wishlist.items());
    }

    #[test]
    fn test_corrupt_storage_yields_empty() {
        let storage = Arc::new(MemoryStore::with_entries([(WISHLIST_STORAGE_KEY, "42")]));
        let mut wishlist = WishlistStore::open(storage);
        assert!(wishlist.is_empty());
        wishlist.add_to_wishlist(&product("a"));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_duplicate_stored_entries_collapse() {
        let stored = serde_json::to_string(&[product("a"), product("b"), product("a")]).unwrap();
        let storage = Arc::new(MemoryStore::with_entries([(WISHLIST_STORAGE_KEY, stored)]));

        let mut wishlist = WishlistStore::open(storage.clone());
        let ids: Vec<_> = wishlist.items().iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        wishlist.remove_from_wishlist("a");
        assert!(!wishlist.is_in_wishlist("a"));

        let restored = WishlistStore::open(storage);
        assert_eq!(restored.len(), 1);
    }
}
