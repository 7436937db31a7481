//! Checkout and order history.

use barely_used_core::ShippingAddress;
use barely_used_storefront::AppError;
use barely_used_storefront::auth::require_principal;
use barely_used_storefront::checkout::{CheckoutError, CheckoutRequest, place_orders};
use barely_used_storefront::stores::CartStore;

use super::{Client, Loading};
use crate::output;

pub fn request(
    street: String,
    city: String,
    zip_code: String,
    country: String,
    payment_method: String,
    buyer_notes: Option<String>,
) -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: ShippingAddress {
            street,
            city,
            zip_code,
            country,
        },
        payment_method,
        buyer_notes: buyer_notes.filter(|n| !n.trim().is_empty()),
    }
}

pub async fn run(
    client: &Client,
    cart: &mut CartStore,
    request: &CheckoutRequest,
) -> Result<(), AppError> {
    match place_orders(client, cart, request).await {
        Ok(orders) => {
            output::orders(&orders);
            output::message("Contact the sellers to arrange payment and delivery.");
            Ok(())
        }
        Err(e) => {
            if let CheckoutError::Order { placed, .. } = &e {
                output::orders(placed);
                output::message(&format!(
                    "{} item(s) are still in your cart. Run checkout again to retry.",
                    cart.len()
                ));
            }
            Err(e.into())
        }
    }
}

/// Orders placed by the signed-in user.
pub async fn orders(client: &Client) -> Result<(), AppError> {
    let buyer = require_principal(client.identity())?;
    let orders = client.list_orders().await.loading("orders")?;
    let mine: Vec<_> = orders
        .into_iter()
        .filter(|o| o.buyer_id == buyer.uid)
        .collect();
    output::orders(&mine);
    Ok(())
}
