//! Integration tests for the Barely Used Bytes storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p barely-used-integration-tests
//! ```
//!
//! No external services are needed: [`FakeApi`] serves the marketplace REST
//! endpoints from memory on an ephemeral local port.
//!
//! # Authentication
//!
//! The fake accepts bearer tokens of the form `token-<uid>` and treats
//! `<uid>` as the signed-in user. [`identity`] builds a matching
//! [`StaticIdentity`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use barely_used_core::{
    Location, Order, OrderCreate, OrderId, Product, ProductCreate, ProductId, ProductUpdate,
    Review, User, UserCreate, UserId, UserUpdate,
};
use barely_used_storefront::auth::{Principal, StaticIdentity};
use barely_used_storefront::config::ApiConfig;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

type Shared = Arc<Mutex<FakeState>>;
type Failure = (StatusCode, Json<Value>);

/// Everything the fake API knows and records.
#[derive(Debug, Default)]
pub struct FakeState {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
    /// Orders for these product ids fail with a 500.
    pub failing_order_products: HashSet<String>,
    /// Number of `GET /products` requests served.
    pub product_list_hits: usize,
    /// `Authorization` header of every order request, in arrival order.
    pub order_authorizations: Vec<Option<String>>,
}

/// In-process stand-in for the marketplace REST API.
pub struct FakeApi {
    base_url: Url,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeApi {
    /// Serve `state` on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(state: FakeState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let state = Arc::new(Mutex::new(state));
        let app = router(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}/")).expect("Invalid fake API URL");
        Self {
            base_url,
            state,
            handle,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        }
    }

    /// Inspect or change the server state.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake API state poisoned")
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A URL nothing is listening on.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    Url::parse(&format!("http://{addr}/")).expect("Invalid URL")
}

/// Identity the fake API accepts for `uid`.
#[must_use]
pub fn identity(uid: &str) -> StaticIdentity {
    StaticIdentity::new(
        Principal {
            uid: UserId::new(uid),
            email: Some(format!("{uid}@example.com")),
            display_name: None,
        },
        SecretString::from(format!("token-{uid}")),
    )
}

/// A listing fixture sold by `seller-1` in Dhaka.
#[must_use]
pub fn product(id: &str, name: &str, category: &str, price: i64) -> Product {
    Product {
        product_id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        subcategory: String::new(),
        description: format!("Used {name} in working order"),
        price: Decimal::new(price, 0),
        currency: "BDT".to_string(),
        condition: "Good".to_string(),
        images: vec![format!("https://img.example.com/{id}.png")],
        seller_id: UserId::new("seller-1"),
        seller_name: "Seller One".to_string(),
        location: Location {
            city: "Dhaka".to_string(),
            country: "Bangladesh".to_string(),
        },
        status: "available".to_string(),
        shipping_options: vec!["local pickup".to_string()],
        ..Product::default()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route("/reviews", get(list_reviews))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).put(update_user))
        .with_state(state)
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().expect("Fake API state poisoned")
}

fn failure(status: StatusCode, detail: &str) -> Failure {
    (status, Json(json!({ "detail": detail })))
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Signed-in uid, from a `Bearer token-<uid>` header.
fn caller(headers: &HeaderMap) -> Result<String, Failure> {
    authorization(headers)
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer token-"))
        .map(str::to_string)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

async fn list_products(State(state): State<Shared>) -> Json<Vec<Product>> {
    let mut state = lock(&state);
    state.product_list_hits += 1;
    Json(state.products.clone())
}

async fn get_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Product>, Failure> {
    lock(&state)
        .products
        .iter()
        .find(|p| p.product_id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), Failure> {
    let uid = caller(&headers)?;
    if payload.seller_id.as_str() != uid {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "Seller ID must match authenticated user.",
        ));
    }

    let mut state = lock(&state);
    let product = Product {
        product_id: ProductId::new(format!("new-{}", state.products.len() + 1)),
        name: payload.name,
        category: payload.category,
        subcategory: payload.subcategory,
        description: payload.description,
        price: payload.price,
        currency: payload.currency,
        condition: payload.condition,
        images: payload.images,
        seller_id: payload.seller_id,
        seller_name: payload.seller_name,
        location: payload.location,
        status: payload.status,
        specifications: payload.specifications,
        years_used: payload.years_used,
        negotiable: payload.negotiable,
        shipping_options: payload.shipping_options,
        posted_at: Some(chrono::Utc::now()),
        updated_at: None,
        views: 0,
    };
    state.products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, Failure> {
    let uid = caller(&headers)?;
    let mut state = lock(&state);
    let product = state
        .products
        .iter_mut()
        .find(|p| p.product_id.as_str() == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Product not found"))?;

    if product.seller_id.as_str() != uid {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "You do not have permission to update this product.",
        ));
    }
    if update.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "No fields provided for update"));
    }

    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(description) = update.description {
        product.description = description;
    }
    if let Some(price) = update.price {
        product.price = price;
    }
    if let Some(category) = update.category {
        product.category = category;
    }
    if let Some(condition) = update.condition {
        product.condition = condition;
    }
    if let Some(status) = update.status {
        product.status = status;
    }
    product.updated_at = Some(chrono::Utc::now());
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    let uid = caller(&headers)?;
    let mut state = lock(&state);
    let index = state
        .products
        .iter()
        .position(|p| p.product_id.as_str() == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Product not found"))?;

    if state.products.get(index).is_some_and(|p| p.seller_id.as_str() != uid) {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "You do not have permission to delete this product.",
        ));
    }
    state.products.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, Failure> {
    let mut state = lock(&state);
    state.order_authorizations.push(authorization(&headers));
    caller(&headers)?;
    Ok(Json(state.orders.clone()))
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), Failure> {
    let mut state = lock(&state);
    state.order_authorizations.push(authorization(&headers));
    let uid = caller(&headers)?;

    if payload.buyer_id.as_str() != uid {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "Buyer ID must match authenticated user.",
        ));
    }
    if state
        .failing_order_products
        .contains(payload.product_id.as_str())
    {
        return Err(failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error creating order: listing is locked",
        ));
    }

    let order = Order {
        order_id: OrderId::new(format!("o{}", state.orders.len() + 1)),
        product_id: payload.product_id,
        buyer_id: payload.buyer_id,
        seller_id: payload.seller_id,
        product_name: payload.product_name,
        product_price: payload.product_price,
        quantity: payload.quantity,
        total_amount: payload.total_amount,
        currency: payload.currency,
        order_status: payload.order_status,
        payment_method: payload.payment_method,
        payment_status: payload.payment_status,
        shipping_address: payload.shipping_address,
        shipping_tracking_number: None,
        seller_notes: None,
        buyer_notes: payload.buyer_notes,
        review_id: None,
        ordered_at: chrono::Utc::now(),
        shipped_at: None,
        delivered_at: None,
    };
    state.orders.push(order.clone());
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_reviews(State(state): State<Shared>) -> Json<Vec<Review>> {
    Json(lock(&state).reviews.clone())
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), Failure> {
    let uid = caller(&headers)?;
    let mut state = lock(&state);
    if state.users.iter().any(|u| u.user_id.as_str() == uid) {
        return Err(failure(StatusCode::BAD_REQUEST, "User profile already exists."));
    }

    let now = chrono::Utc::now();
    let user = User {
        user_id: UserId::new(uid),
        email: payload.email,
        display_name: payload.display_name,
        profile_picture_url: payload.profile_picture_url,
        phone_number: payload.phone_number,
        address: payload.address,
        roles: payload.roles.unwrap_or_else(|| vec!["buyer".to_string()]),
        bio: payload.bio,
        rating: 0.0,
        total_reviews: 0,
        is_verified_seller: false,
        created_at: now,
        last_login_at: now,
    };
    state.users.push(user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>, Failure> {
    caller(&headers)?;
    lock(&state)
        .users
        .iter()
        .find(|u| u.user_id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))
}

async fn update_user(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, Failure> {
    let uid = caller(&headers)?;
    if uid != id {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "You do not have permission to update this profile.",
        ));
    }

    let mut state = lock(&state);
    let user = state
        .users
        .iter_mut()
        .find(|u| u.user_id.as_str() == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;

    if let Some(display_name) = update.display_name {
        user.display_name = display_name;
    }
    if let Some(bio) = update.bio {
        user.bio = Some(bio);
    }
    if let Some(roles) = update.roles {
        user.roles = roles;
    }
    Ok(Json(user.clone()))
}
