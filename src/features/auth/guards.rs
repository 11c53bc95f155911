//! Role-based authorization guards.
//!
//! Guards read the `AuthenticatedUser` placed in request extensions by the
//! auth middleware and reject with 401 when it is absent, 403 when the role
//! does not match.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for endpoints reserved to officials (status review, audit trail).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireOfficial(user): RequireOfficial) { ... }
/// ```
pub struct RequireOfficial(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireOfficial
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        if !user.is_official() {
            return Err(AppError::Forbidden("Official access required".to_string()));
        }

        Ok(RequireOfficial(user.clone()))
    }
}
