//! C11: the `Authorization: Bearer <jwt>` extractor every non-public route
//! pulls a `Principal` through, plus the role gate handlers check it against.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;

use common::jwt::{JwtManager, Principal};
use common::role::Role;

use crate::api::error::ApiError;
use crate::api::http_routes::AppState;
use crate::domain::error::AuthError;

/// Wraps `common::jwt::Principal` — both are foreign to this crate, so a
/// local newtype is the only way to give it an extractor impl.
pub struct AuthenticatedUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = JwtManager::extract_bearer(header).ok_or(AuthError::MissingToken)?;

        let claims = state
            .jwt
            .parse_access_token(token)
            .map_err(|_| AuthError::InvalidToken)?;
        let principal = Principal::from(&claims);

        // A session row must still exist: logout (and login displacing a
        // prior session) deletes it, so a structurally valid JWT alone
        // isn't enough once it's been revoked.
        let session = state
            .session_store
            .get_session(principal.token_id.into())
            .await
            .map_err(|e| AuthError::Cache(e.to_string()))?;
        if session.is_none() {
            return Err(AuthError::TokenRevoked.into());
        }

        Ok(AuthenticatedUser(principal))
    }
}

/// C11's role gate: reject with `AuthError::Forbidden` unless the caller's
/// role is one of `allowed`.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    if principal.role.is_allowed(allowed) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(principal.role.to_string()).into())
    }
}
