//! One shopper's session: the cart and wishlist over a shared storage.
//!
//! A session is created at startup, handed to whatever needs the stores,
//! and ended explicitly so pending writes get one last chance to land.

use std::sync::Arc;

use tracing::{info, warn};

use crate::storage::KeyValueStore;
use crate::stores::{CartStore, WishlistStore};

/// Cart and wishlist for the lifetime of one session.
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    cart: CartStore,
    wishlist: WishlistStore,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cart", &self.cart)
            .field("wishlist", &self.wishlist)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open and hydrate both stores from `storage`.
    #[must_use]
    pub fn start(storage: Arc<dyn KeyValueStore>) -> Self {
        let cart = CartStore::open(Arc::clone(&storage));
        let wishlist = WishlistStore::open(Arc::clone(&storage));
        info!(
            cart_items = cart.len(),
            wishlist_items = wishlist.len(),
            "Session started"
        );
        Self {
            storage,
            cart,
            wishlist,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    /// Storage backing both stores.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// End the session, retrying any write that failed earlier.
    ///
    /// Failures are logged; the session is gone either way.
    pub fn end(mut self) {
        if let Err(e) = self.cart.flush() {
            warn!(error = %e, "Cart could not be saved at session end");
        }
        if let Err(e) = self.wishlist.flush() {
            warn!(error = %e, "Wishlist could not be saved at session end");
        }
        info!("Session ended");
    }
}
