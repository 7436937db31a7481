//! Wishlist commands.

use barely_used_core::ProductId;
use barely_used_storefront::AppError;
use barely_used_storefront::stores::WishlistStore;

use super::{Client, Loading};
use crate::output;

pub async fn add(client: &Client, wishlist: &mut WishlistStore, id: &str) -> Result<(), AppError> {
    if wishlist.is_in_wishlist(id) {
        output::message("Already in your wishlist.");
        return Ok(());
    }
    let product = client
        .get_product(&ProductId::new(id))
        .await
        .loading("product")?;
    wishlist.add_to_wishlist(&product);
    output::message(&format!("Added {} to your wishlist.", product.name));
    Ok(())
}

pub fn remove(wishlist: &mut WishlistStore, id: &str) {
    if wishlist.is_in_wishlist(id) {
        wishlist.remove_from_wishlist(id);
        output::message("Removed from your wishlist.");
    } else {
        output::message("That item is not in your wishlist.");
    }
}

pub fn clear(wishlist: &mut WishlistStore) {
    wishlist.clear_wishlist();
    output::message("Your wishlist is empty.");
}
