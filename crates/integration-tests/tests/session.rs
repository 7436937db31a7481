//! Cart and wishlist persistence across sessions with file storage.

use std::fs;
use std::sync::Arc;

use barely_used_integration_tests::product;
use barely_used_storefront::Session;
use barely_used_storefront::storage::{FileStore, KeyValueStore};
use barely_used_storefront::stores::CartStore;
use rust_decimal::Decimal;

fn store(dir: &std::path::Path) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir).unwrap())
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = Session::start(store(dir.path()));
    let gpu = product("p1", "RTX 3080", "GPUs", 100);
    session.cart_mut().add_to_cart(&gpu, 2);
    session.cart_mut().add_to_cart(&product("p2", "Ryzen 5", "CPUs", 50), 1);
    session.wishlist_mut().add_to_wishlist(&gpu);
    let before = session.cart().items().to_vec();
    session.end();

    assert!(dir.path().join("bub_cart.json").exists());
    assert!(dir.path().join("bub_wishlist.json").exists());

    let session = Session::start(store(dir.path()));
    assert_eq!(session.cart().items(), before.as_slice());
    assert_eq!(session.cart().total_items(), 3);
    assert_eq!(session.cart().total_price(), Some(Decimal::new(250, 0)));
    assert!(session.wishlist().is_in_wishlist("p1"));
}

#[test]
fn test_corrupt_slot_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bub_cart.json"), "{not json").unwrap();

    let mut session = Session::start(store(dir.path()));
    assert!(session.cart().is_empty());
    assert!(session.cart().is_hydrated());

    session
        .cart_mut()
        .add_to_cart(&product("p1", "RTX 3080", "GPUs", 100), 1);
    session.end();

    let cart = CartStore::open(store(dir.path()));
    assert_eq!(cart.len(), 1);
}

#[test]
fn test_last_writer_wins_between_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = Session::start(store(dir.path()));
    let mut second = Session::start(store(dir.path()));

    first
        .cart_mut()
        .add_to_cart(&product("p1", "RTX 3080", "GPUs", 100), 1);
    second
        .cart_mut()
        .add_to_cart(&product("p2", "Ryzen 5", "CPUs", 50), 1);
    first.end();
    second.end();

    let cart = CartStore::open(store(dir.path()));
    let ids: Vec<&str> = cart
        .items()
        .iter()
        .map(|i| i.product.product_id.as_str())
        .collect();
    assert_eq!(ids, vec!["p2"]);
}
