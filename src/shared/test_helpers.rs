use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};

use crate::core::config::CategoryDefaults;
use crate::features::auth::model::{AuthenticatedUser, SessionClaims, UserRole};
use crate::features::categories::store::InMemoryCategoryStore;
use crate::features::categories::CategoryService;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

pub fn admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "admin-1".to_string(),
        role: UserRole::Admin,
        email: Some("admin@example.com".to_string()),
        name: Some("Admin".to_string()),
    }
}

pub fn regular_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "user-1".to_string(),
        role: UserRole::User,
        email: None,
        name: None,
    }
}

/// HS256 session token signed with [`TEST_JWT_SECRET`], valid for an hour
pub fn mint_token(sub: &str, role: UserRole) -> String {
    mint_token_with(sub, role, TEST_JWT_SECRET, 3600, None)
}

pub fn mint_token_with(
    sub: &str,
    role: UserRole,
    secret: &str,
    expires_in_secs: i64,
    issuer: Option<&str>,
) -> String {
    let exp = (chrono::Utc::now().timestamp() + expires_in_secs).max(0) as u64;
    let claims = SessionClaims {
        sub: sub.to_string(),
        role,
        email: None,
        name: None,
        iss: issuer.map(str::to_string),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign test token")
}

/// Service over a fresh in-memory store; the store handle is returned for
/// assertions on persisted state.
pub fn category_service() -> (Arc<CategoryService>, Arc<InMemoryCategoryStore>) {
    let store = Arc::new(InMemoryCategoryStore::new());
    let service = Arc::new(CategoryService::new(
        store.clone(),
        CategoryDefaults::default(),
    ));
    (service, store)
}
