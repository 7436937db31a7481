//! Session-scoped state containers synchronized to local storage.
//!
//! Both stores share one synchronization rule, implemented once in
//! [`SyncedCollection`]:
//!
//! 1. Hydrate from the store's storage slot once. Unreadable or corrupt
//!    slots are logged and leave the collection empty.
//! 2. Before hydration, mutations stay in memory and are never written, so
//!    an empty initial value cannot clobber stored state.
//! 3. After hydration, every change rewrites the whole collection to its
//!    slot and notifies subscribers. Write failures are logged and the
//!    in-memory state stays authoritative.

mod cart;
mod observer;
mod synced;
mod wishlist;

pub use cart::{CartItem, CartStore};
pub use observer::{Listeners, SubscriptionId};
pub use synced::SyncedCollection;
pub use wishlist::WishlistStore;
