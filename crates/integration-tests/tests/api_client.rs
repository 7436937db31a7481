//! `ApiClient` against the in-process fake API.

use barely_used_core::{
    OrderCreate, OrderId, OrderStatus, PaymentStatus, ProductId, Review, ReviewId,
    ShippingAddress, UserId,
};
use barely_used_integration_tests::{FakeApi, FakeState, identity, product, unreachable_url};
use barely_used_storefront::LoadError;
use barely_used_storefront::api::{ApiClient, ApiError};
use barely_used_storefront::auth::Anonymous;
use barely_used_storefront::config::StorefrontConfig;
use reqwest::StatusCode;
use rust_decimal::Decimal;

fn catalog() -> FakeState {
    let mut gpu = product("p1", "RTX 3080", "GPUs", 55_000);
    gpu.subcategory = "NVIDIA".to_string();
    let mut cpu = product("p2", "Ryzen 5 5600X", "CPUs", 14_000);
    cpu.subcategory = "AMD".to_string();
    let ram = product("p3", "Corsair Vengeance 16GB", "RAM", 4_500);

    FakeState {
        products: vec![gpu, cpu, ram],
        ..FakeState::default()
    }
}

fn order_for(buyer: &str) -> OrderCreate {
    OrderCreate {
        product_id: ProductId::new("p1"),
        buyer_id: UserId::new(buyer),
        seller_id: UserId::new("seller-1"),
        product_name: "RTX 3080".to_string(),
        product_price: Decimal::new(55_000, 0),
        quantity: 1,
        total_amount: Decimal::new(55_000, 0),
        currency: "BDT".to_string(),
        order_status: OrderStatus::PendingPayment,
        payment_method: "cash on delivery".to_string(),
        payment_status: PaymentStatus::Unpaid,
        shipping_address: ShippingAddress {
            street: "1 Road".to_string(),
            city: "Dhaka".to_string(),
            zip_code: "1207".to_string(),
            country: "Bangladesh".to_string(),
        },
        buyer_notes: None,
    }
}

#[tokio::test]
async fn test_list_products_is_cached() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), Anonymous).unwrap();

    let first = client.list_products().await.unwrap();
    let second = client.list_products().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(api.state().product_list_hits, 1);
}

#[tokio::test]
async fn test_get_product_and_not_found() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), Anonymous).unwrap();

    let product = client.get_product(&ProductId::new("p2")).await.unwrap();
    assert_eq!(product.name, "Ryzen 5 5600X");

    let err = client
        .get_product(&ProductId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::NotFound(detail) if detail == "Product not found"));
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(
        LoadError::from_api(&err, "product"),
        LoadError::NotFound("Product".to_string())
    );
}

#[tokio::test]
async fn test_client_side_filters() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), Anonymous).unwrap();

    let gpus = client.products_by_category("gpus").await.unwrap();
    assert_eq!(gpus.len(), 1);
    assert_eq!(gpus[0].product_id.as_str(), "p1");

    // Subcategory counts for API search
    let amd = client.search_products("AMD").await.unwrap();
    assert_eq!(amd.len(), 1);
    assert_eq!(amd[0].product_id.as_str(), "p2");

    assert_eq!(client.search_products("").await.unwrap().len(), 3);
    assert_eq!(api.state().product_list_hits, 1);
}

#[tokio::test]
async fn test_authenticated_call_sends_bearer_token() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), identity("buyer-1")).unwrap();

    let order = client.create_order(&order_for("buyer-1")).await.unwrap();
    assert_eq!(order.order_id, OrderId::new("o1"));
    assert_eq!(order.order_status, OrderStatus::PendingPayment);
    assert_eq!(
        api.state().order_authorizations,
        vec![Some("Bearer token-buyer-1".to_string())]
    );

    let fetched = client.list_orders().await.unwrap();
    assert_eq!(fetched.len(), 1);
}

#[tokio::test]
async fn test_anonymous_call_surfaces_detail() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), Anonymous).unwrap();

    let err = client.create_order(&order_for("buyer-1")).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.to_string(), "Not authenticated");
    assert_eq!(api.state().order_authorizations, vec![None]);
}

#[tokio::test]
async fn test_product_mutation_invalidates_cache() {
    let api = FakeApi::start(catalog()).await;
    let client = ApiClient::new(&api.config(), identity("seller-1")).unwrap();

    client.list_products().await.unwrap();
    client
        .delete_product(&ProductId::new("p3"))
        .await
        .unwrap();

    let products = client.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(api.state().product_list_hits, 2);
}

#[tokio::test]
async fn test_reviews_filtered_client_side() {
    let review = |id: &str, seller: &str, product: &str| Review {
        review_id: ReviewId::new(id),
        product_id: ProductId::new(product),
        seller_id: UserId::new(seller),
        reviewer_id: UserId::new("buyer-1"),
        order_id: OrderId::new("o1"),
        rating: 5,
        comment: "Great seller".to_string(),
        product_name: "RTX 3080".to_string(),
        seller_name: "Seller".to_string(),
        reviewer_name: "Buyer".to_string(),
        is_approved: true,
        helpful_votes: 0,
        reviewed_at: chrono::Utc::now(),
    };
    let state = FakeState {
        reviews: vec![
            review("r1", "seller-1", "p1"),
            review("r2", "seller-2", "p2"),
            review("r3", "seller-1", "p3"),
        ],
        ..FakeState::default()
    };
    let api = FakeApi::start(state).await;
    let client = ApiClient::new(&api.config(), Anonymous).unwrap();

    assert_eq!(client.reviews_for_seller("seller-1").await.unwrap().len(), 2);
    assert_eq!(client.reviews_for_product("p2").await.unwrap().len(), 1);
    assert!(client.reviews_for_product("nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_classified() {
    let config = StorefrontConfig::for_api(unreachable_url().await);
    let client = ApiClient::new(&config.api, Anonymous).unwrap();

    let err = client.list_products().await.unwrap_err();
    assert!(err.is_unreachable(), "unexpected error: {err:?}");

    let load = LoadError::from_api(&err, "products");
    assert_eq!(load, LoadError::ServerUnreachable);
    assert!(load.is_retryable());
}
