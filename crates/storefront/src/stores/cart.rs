//! Shopping cart.

use std::collections::BTreeMap;
use std::sync::Arc;

use barely_used_core::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::observer::SubscriptionId;
use super::synced::SyncedCollection;
use crate::storage::{CART_STORAGE_KEY, KeyValueStore, StorageError};

/// A listing the user intends to buy, with quantity.
///
/// The product is the snapshot taken when it was first added; later adds
/// of the same listing bump the quantity but keep this snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`, or `None` if it does not fit in a [`Decimal`].
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Merge items sharing a product id into the first one and drop items with
/// no quantity.
fn merge_duplicates(items: &mut Vec<CartItem>) -> bool {
    let before = items.clone();
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if let Some(existing) = merged
            .iter_mut()
            .find(|m| m.product.product_id == item.product.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            merged.push(item);
        }
    }
    merged.retain(|item| item.quantity > 0);
    *items = merged;
    *items != before
}

/// The cart, keyed by product id with at most one item per id.
#[derive(Debug)]
pub struct CartStore {
    inner: SyncedCollection<CartItem>,
}

impl CartStore {
    /// Open the cart bound to [`CART_STORAGE_KEY`] and hydrate it.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut cart = Self::new(storage);
        cart.hydrate();
        cart
    }

    /// Create an unhydrated cart. Call [`hydrate`](Self::hydrate) before
    /// changes are written back.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: SyncedCollection::new(storage, CART_STORAGE_KEY)
                .with_normalizer(merge_duplicates),
        }
    }

    /// Load the stored cart (once).
    pub fn hydrate(&mut self) {
        self.inner.hydrate();
    }

    /// Add `quantity` of a product.
    ///
    /// If the product is already in the cart its quantity is increased;
    /// otherwise a new item is appended. A zero quantity is ignored.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = %product.product_id, "Ignoring add of zero quantity");
            return;
        }

        self.inner.mutate(|items| {
            if let Some(item) = items
                .iter_mut()
                .find(|item| item.product.product_id == product.product_id)
            {
                item.quantity = item.quantity.saturating_add(quantity);
            } else {
                items.push(CartItem {
                    product: product.clone(),
                    quantity,
                });
            }
            true
        });
    }

    /// Remove the item for `product_id`. Absent ids are a no-op.
    pub fn remove_from_cart(&mut self, product_id: &str) {
        self.inner.mutate(|items| {
            let before = items.len();
            items.retain(|item| item.product.product_id.as_str() != product_id);
            items.len() != before
        });
    }

    /// Set the quantity for `product_id`.
    ///
    /// A quantity of zero or less removes the item. Absent ids are ignored;
    /// this never creates an item.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity.min(i64::from(u32::MAX))) else {
            self.remove_from_cart(product_id);
            return;
        };
        if quantity == 0 {
            self.remove_from_cart(product_id);
            return;
        }

        self.inner.mutate(|items| {
            items
                .iter_mut()
                .find(|item| item.product.product_id.as_str() == product_id)
                .is_some_and(|item| {
                    let changed = item.quantity != quantity;
                    item.quantity = quantity;
                    changed
                })
        });
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.inner.mutate(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        });
    }

    /// Sum of quantities across all items (not the number of items).
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.inner
            .items()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Sum of `price × quantity` across all items, or `None` on overflow.
    ///
    /// Currencies are mixed without conversion; use
    /// [`currency_totals`](Self::currency_totals) for display.
    #[must_use]
    pub fn total_price(&self) -> Option<Decimal> {
        self.inner
            .items()
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
    }

    /// `price × quantity` grouped by currency code. A currency whose total
    /// overflows maps to `None`.
    #[must_use]
    pub fn currency_totals(&self) -> BTreeMap<String, Option<Decimal>> {
        let mut totals: BTreeMap<String, Option<Decimal>> = BTreeMap::new();
        for item in self.inner.items() {
            let total = totals
                .entry(item.product.currency.clone())
                .or_insert(Some(Decimal::ZERO));
            *total = total.and_then(|sum| sum.checked_add(item.line_total()?));
        }
        totals
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.inner.items()
    }

    /// The item for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.inner
            .items()
            .iter()
            .find(|item| item.product.product_id.as_str() == product_id)
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items().len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items().is_empty()
    }

    /// Whether the cart has been hydrated.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.inner.is_hydrated()
    }

    /// JSON form of the cart as written to storage.
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
        F: Fn(&[CartItem]) + Send + Sync + 'static,
    {
        self.inner.subscribe(callback)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use barely_used_core::ProductId;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: &str, price: i64, currency: &str) -> Product {
        Product {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(price, 0),
            currency: currency.to_string(),
            ..Product::default()
        }
    }

    fn cart() -> (Arc<MemoryStore>, CartStore) {
        let storage = Arc::new(MemoryStore::new());
        let cart = CartStore::open(storage.clone());
        (storage, cart)
    }

    #[test]
    fn test_repeated_adds_accumulate_quantity() {
        let (_, mut cart) = cart();
        let gpu = product("gpu-1", 500, "USD");

        cart.add_to_cart(&gpu, 1);
        cart.add_to_cart(&gpu, 2);
        cart.add_to_cart(&gpu, 4);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("gpu-1").unwrap().quantity, 7);
    }

    #[test]
    fn test_add_keeps_original_snapshot() {
        let (_, mut cart) = cart();
        let original = product("gpu-1", 500, "USD");
        let mut repriced = original.clone();
        repriced.price = Decimal::new(450, 0);

        cart.add_to_cart(&original, 1);
        cart.add_to_cart(&repriced, 1);

        let item = cart.get("gpu-1").unwrap();
        assert_eq!(item.product.price, Decimal::new(500, 0));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_add_zero_is_ignored() {
        let (storage, mut cart) = cart();
        cart.add_to_cart(&product("a", 1, "USD"), 0);
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_update_quantity_non_positive_removes() {
        let (_, mut cart) = cart();
        cart.add_to_cart(&product("a", 10, "USD"), 3);
        cart.add_to_cart(&product("b", 10, "USD"), 3);

        cart.update_quantity("a", 0);
        cart.update_quantity("b", -5);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let (storage, mut cart) = cart();
        cart.add_to_cart(&product("a", 10, "USD"), 1);
        let before = storage.get(CART_STORAGE_KEY).unwrap();

        cart.update_quantity("missing", 4);

        assert_eq!(cart.len(), 1);
        assert!(cart.get("missing").is_none());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), before);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let (_, mut cart) = cart();
        cart.add_to_cart(&product("a", 10, "USD"), 1);
        cart.update_quantity("a", 9);
        assert_eq!(cart.get("a").unwrap().quantity, 9);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (_, mut cart) = cart();
        cart.add_to_cart(&product("a", 10, "USD"), 1);
        cart.remove_from_cart("zzz");
        cart.remove_from_cart("a");
        cart.remove_from_cart("a");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let (_, mut cart) = cart();
        cart.add_to_cart(&product("a", 100, "USD"), 2);
        cart.add_to_cart(&product("b", 50, "USD"), 3);
        assert_eq!(cart.total_items(), 5);

        cart.update_quantity("b", 1);
        assert_eq!(cart.total_price(), Some(Decimal::new(250, 0)));
    }

    #[test]
    fn test_currency_totals_group_by_code() {
        let (_, mut cart) = cart();
        cart.add_to_cart(&product("a", 100, "USD"), 2);
        cart.add_to_cart(&product("b", 5000, "BDT"), 1);
        cart.add_to_cart(&product("c", 25, "USD"), 1);

        let totals = cart.currency_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["USD"], Some(Decimal::new(225, 0)));
        assert_eq!(totals["BDT"], Some(Decimal::new(5000, 0)));
        // Mixed sum, no conversion.
        assert_eq!(cart.total_price(), Some(Decimal::new(5225, 0)));
    }

    #[test]
    fn test_clear_cart_persists_empty() {
        let (storage, mut cart) = cart();
        cart.add_to_cart(&product("a", 100, "USD"), 2);
        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rehydrate_reproduces_collection() {
        let (storage, mut cart) = cart();
        let mut gpu = product("gpu-1", 500, "USD");
        gpu.images = vec!["https://img/gpu.png".to_string()];
        gpu.condition = "Excellent".to_string();
        cart.add_to_cart(&gpu, 2);
        cart.add_to_cart(&product("cpu-1", 200, "BDT"), 1);

        let restored = CartStore::open(storage);
        assert_eq!(restored.items(), cart.items());
    }

    #[test]
    fn test_corrupt_storage_yields_empty_usable_cart() {
        let storage = Arc::new(MemoryStore::with_entries([(CART_STORAGE_KEY, "[{\"oops\"")]));
        let mut cart = CartStore::open(storage);
        assert!(cart.is_empty());

        cart.add_to_cart(&product("a", 1, "USD"), 1);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_huge_totals_report_overflow() {
        let (_, mut cart) = cart();
        let mut server = product("x", 0, "USD");
        server.price = Decimal::MAX;
        cart.add_to_cart(&server, 1);
        cart.update_quantity("x", i64::from(u32::MAX));
        cart.add_to_cart(&product("y", 10, "BDT"), 2);

        assert_eq!(cart.get("x").unwrap().line_total(), None);
        assert_eq!(cart.total_price(), None);

        let totals = cart.currency_totals();
        assert_eq!(totals["USD"], None);
        assert_eq!(totals["BDT"], Some(Decimal::new(20, 0)));
    }

    #[test]
    fn test_stored_duplicates_are_merged() {
        let a = product("a", 10, "USD");
        let stored = serde_json::to_string(&[
            CartItem { product: a.clone(), quantity: 2 },
            CartItem { product: product("b", 5, "USD"), quantity: 0 },
            CartItem { product: a, quantity: 3 },
        ])
        .unwrap();
        let storage = Arc::new(MemoryStore::with_entries([(CART_STORAGE_KEY, stored)]));

        let mut cart = CartStore::open(storage.clone());
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 5);

        cart.update_quantity("a", 1);
        assert_eq!(cart.total_items(), 1);
        assert_eq!(CartStore::open(storage).items(), cart.items());
    }

    #[test]
    fn test_zero_quantity_only_slot_loads_empty() {
        let stored =
            serde_json::to_string(&[CartItem { product: product("a", 10, "USD"), quantity: 0 }])
                .unwrap();
        let storage = Arc::new(MemoryStore::with_entries([(CART_STORAGE_KEY, stored)]));

        let mut cart = CartStore::open(storage.clone());
        assert!(cart.is_empty());

        cart.flush().unwrap();
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }
}
