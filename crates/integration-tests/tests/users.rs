//! Profile endpoints against the fake API.

use barely_used_core::{UserCreate, UserId, UserUpdate};
use barely_used_integration_tests::{FakeApi, FakeState, identity};
use barely_used_storefront::api::{ApiClient, ApiError};

#[tokio::test]
async fn test_profile_lifecycle() {
    let api = FakeApi::start(FakeState::default()).await;
    let client = ApiClient::new(&api.config(), identity("seller-1")).unwrap();
    let uid = UserId::new("seller-1");

    let missing = client.get_user(&uid).await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));

    let created = client
        .create_user(&UserCreate {
            email: "seller-1@example.com".to_string(),
            display_name: "Seller One".to_string(),
            ..UserCreate::default()
        })
        .await
        .unwrap();
    assert_eq!(created.user_id, uid);
    assert!(!created.is_seller());

    let updated = client
        .update_user(
            &uid,
            &UserUpdate {
                roles: Some(vec!["buyer".to_string(), "seller".to_string()]),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_seller());

    let fetched = client.get_user(&uid).await.unwrap();
    assert_eq!(fetched.display_name, "Seller One");
    assert!(fetched.is_seller());
}

#[tokio::test]
async fn test_cannot_update_someone_else() {
    let api = FakeApi::start(FakeState::default()).await;
    let client = ApiClient::new(&api.config(), identity("buyer-1")).unwrap();

    let err = client
        .update_user(&UserId::new("seller-1"), &UserUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You do not have permission to update this profile.");
}
