//! Turn the cart into orders.
//!
//! The API takes one order per listing, so checkout places one order per
//! cart item in cart order. Each successfully ordered item leaves the cart
//! right away; the first failure stops checkout with the remaining items
//! still in the cart, so retrying only orders what is left.

use barely_used_core::{
    Order, OrderCreate, OrderStatus, PaymentStatus, ProductId, ShippingAddress,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthError, IdentityProvider, require_principal};
use crate::stores::CartStore;

/// Payment method used when none is chosen.
pub const DEFAULT_PAYMENT_METHOD: &str = "cash on delivery";

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fill in the shipping {0}")]
    IncompleteAddress(&'static str),

    #[error("The order total for {0} is too large")]
    TotalTooLarge(ProductId),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Ordering `product_id` failed after `placed` orders went through.
    #[error("Failed to order {product_id}: {source}")]
    Order {
        placed: Vec<Order>,
        product_id: ProductId,
        #[source]
        source: ApiError,
    },
}

/// Details collected on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub buyer_notes: Option<String>,
}

impl CheckoutRequest {
    #[must_use]
    pub fn new(shipping_address: ShippingAddress) -> Self {
        Self {
            shipping_address,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            buyer_notes: None,
        }
    }

    fn validate(&self) -> Result<(), CheckoutError> {
        let address = &self.shipping_address;
        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("zip code", &address.zip_code),
            ("country", &address.country),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::IncompleteAddress(field));
            }
        }
        Ok(())
    }
}

/// Place one order per cart item for the signed-in buyer.
///
/// Returns the orders placed, in cart order.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`], [`CheckoutError::IncompleteAddress`],
/// [`CheckoutError::Auth`] or [`CheckoutError::TotalTooLarge`] before
/// anything is ordered, and
/// [`CheckoutError::Order`] if an order fails partway through.
#[instrument(skip_all, fields(items = cart.len()))]
pub async fn place_orders<I: IdentityProvider>(
    client: &ApiClient<I>,
    cart: &mut CartStore,
    request: &CheckoutRequest,
) -> Result<Vec<Order>, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    request.validate()?;
    let buyer = require_principal(client.identity())?;

    let items = cart
        .items()
        .iter()
        .map(|item| {
            item.line_total()
                .map(|total| (item.clone(), total))
                .ok_or_else(|| CheckoutError::TotalTooLarge(item.product.product_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut placed = Vec::with_capacity(items.len());

    for (item, total_amount) in items {
        let product = &item.product;
        let payload = OrderCreate {
            product_id: product.product_id.clone(),
            buyer_id: buyer.uid.clone(),
            seller_id: product.seller_id.clone(),
            product_name: product.name.clone(),
            product_price: product.price,
            quantity: item.quantity,
            total_amount,
            currency: product.currency.clone(),
            order_status: OrderStatus::PendingPayment,
            payment_method: request.payment_method.clone(),
            payment_status: PaymentStatus::Unpaid,
            shipping_address: request.shipping_address.clone(),
            buyer_notes: request.buyer_notes.clone(),
        };

        match client.create_order(&payload).await {
            Ok(order) => {
                info!(order_id = %order.order_id, product_id = %product.product_id, "Order placed");
                cart.remove_from_cart(product.product_id.as_str());
                placed.push(order);
            }
            Err(source) => {
                warn!(product_id = %product.product_id, error = %source, "Order failed");
                return Err(CheckoutError::Order {
                    placed,
                    product_id: product.product_id.clone(),
                    source,
                });
            }
        }
    }

    Ok(placed)
}
