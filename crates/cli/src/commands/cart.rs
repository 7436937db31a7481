//! Cart commands.

use barely_used_core::ProductId;
use barely_used_storefront::AppError;
use barely_used_storefront::stores::CartStore;

use super::{Client, Loading};
use crate::output;

pub async fn add(
    client: &Client,
    cart: &mut CartStore,
    id: &str,
    quantity: u32,
) -> Result<(), AppError> {
    let product = client
        .get_product(&ProductId::new(id))
        .await
        .loading("product")?;
    cart.add_to_cart(&product, quantity);
    output::message(&format!("Added {quantity} x {} to your cart.", product.name));
    output::cart(cart);
    Ok(())
}

pub fn remove(cart: &mut CartStore, id: &str) {
    if cart.get(id).is_some() {
        cart.remove_from_cart(id);
        output::message("Removed from your cart.");
    } else {
        output::message("That item is not in your cart.");
    }
}

pub fn update(cart: &mut CartStore, id: &str, quantity: i64) {
    cart.update_quantity(id, quantity);
    output::cart(cart);
}

pub fn clear(cart: &mut CartStore) {
    cart.clear_cart();
    output::message("Your cart is empty.");
}
