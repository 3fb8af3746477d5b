//! Role-based authorization guards.
//!
//! The wiki knows two roles:
//! - admin: manages categories and articles through the admin console
//! - user: reads published content
//!
//! Guards read the identity attached by `optional_auth_middleware`; a request
//! without one is anonymous.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for mutating wiki content.
///
/// Anonymous callers get 401, authenticated non-admins get 403.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.user_id, role = %user.role, "Rejected non-admin mutation");
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Identity of the caller if one was presented; never rejects.
pub struct MaybeAuthenticated(pub Option<AuthenticatedUser>);

impl MaybeAuthenticated {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(AuthenticatedUser::is_admin)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}
