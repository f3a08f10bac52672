//! Integration tests for registration and login
//!
//! Run against the in-memory store, so no database is needed.

use std::sync::Arc;
use tasktrack_shared::auth::credentials::{CredentialError, CredentialStore};
use tasktrack_shared::auth::jwt::TokenIssuer;
use tasktrack_shared::models::user::Role;
use tasktrack_shared::store::memory::MemoryStore;
use tasktrack_shared::store::UserRepository;

const PASSWORD: &str = "Lovelace#1";

fn setup() -> (Arc<MemoryStore>, CredentialStore) {
    let store = Arc::new(MemoryStore::new());
    let credentials = CredentialStore::new(store.clone());
    (store, credentials)
}

#[tokio::test]
async fn test_register_creates_user_with_hashed_password() {
    let (store, credentials) = setup();

    let user = credentials
        .register("ada", "ada@example.com", PASSWORD)
        .await
        .expect("Registration should succeed");

    assert_eq!(user.username, "ada");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, Role::User);
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, PASSWORD);

    let stored = store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored, user);
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (store, credentials) = setup();

    credentials
        .register("ada", "ada@example.com", PASSWORD)
        .await
        .unwrap();
    let second = credentials
        .register("ada", "other@example.com", PASSWORD)
        .await;

    assert!(matches!(second, Err(CredentialError::DuplicateCredential)));
    assert_eq!(store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let (_store, credentials) = setup();

    credentials
        .register("ada", "ada@example.com", PASSWORD)
        .await
        .unwrap();
    let second = credentials
        .register("grace", "ada@example.com", PASSWORD)
        .await;

    assert!(matches!(second, Err(CredentialError::DuplicateCredential)));
}

#[tokio::test]
async fn test_concurrent_registrations_single_winner() {
    let (store, credentials) = setup();

    let attempts = (0..4).map(|i| {
        let credentials = credentials.clone();
        tokio::spawn(async move {
            credentials
                .register("racer", &format!("racer{}@example.com", i), PASSWORD)
                .await
        })
    });

    let mut successes = 0;
    for handle in attempts.collect::<Vec<_>>() {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CredentialError::DuplicateCredential) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let (store, credentials) = setup();

    let result = credentials
        .register("ada", "ada@example.com", "password")
        .await;

    assert!(matches!(result, Err(CredentialError::WeakPassword(_))));
    assert_eq!(store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_verify_correct_password() {
    let (_store, credentials) = setup();
    let user = credentials
        .register("ada", "ada@example.com", PASSWORD)
        .await
        .unwrap();

    let verified = credentials.verify("ada", PASSWORD).await.unwrap();

    assert_eq!(verified.id, user.id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (_store, credentials) = setup();
    credentials
        .register("ada", "ada@example.com", PASSWORD)
        .await
        .unwrap();

    let wrong_password = credentials.verify("ada", "Wrong#Pass1").await.unwrap_err();
    let unknown_user = credentials.verify("nobody", PASSWORD).await.unwrap_err();

    assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
    assert!(matches!(unknown_user, CredentialError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_provision_admin_and_issue_token() {
    let (_store, credentials) = setup();
    let issuer = TokenIssuer::new("integration-test-secret-32-bytes-long");

    let admin = credentials
        .provision("root", "root@example.com", "Admin@123", Role::Admin)
        .await
        .unwrap();
    let logged_in = credentials.verify("root", "Admin@123").await.unwrap();
    let claims = issuer.validate(&issuer.issue(&logged_in).unwrap()).unwrap();

    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.username, "root");
}
