//! JWT issuance/verification for C11 (Auth & Role Gate).
//!
//! Claims shape and the access/refresh dual-secret split are taken from the
//! original service's `shared/model/jwt.go` + `shared/utils/jwt.go`.

use crate::ids::{TenantId, UserId};
use crate::role::Role;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sessions (and therefore access tokens) live for 7 days by default.
pub const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub tenant_id: TenantId,
    pub role: Role,
    /// Registered `jti` claim; doubles as the session cache key (token-id).
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// The principal extracted from a verified token, independent of its JWT
/// encoding (no `exp`/`iat` noise leaking into request handlers).
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub token_id: Uuid,
}

impl From<&Claims> for Principal {
    fn from(c: &Claims) -> Self {
        Self {
            user_id: c.sub,
            tenant_id: c.tenant_id,
            role: c.role,
            token_id: c.jti,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("token is invalid or expired")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies the access/refresh token pair.
///
/// Two distinct HS256 secrets are used (access vs. refresh) so that a leaked
/// access token can never be replayed against `/auth/refresh`.
pub struct JwtManager {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
}

impl JwtManager {
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    fn claims_for(
        user_id: UserId,
        email: &str,
        tenant_id: TenantId,
        role: Role,
        token_id: Uuid,
        ttl_seconds: i64,
    ) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: user_id,
            email: email.to_string(),
            tenant_id,
            role,
            jti: token_id,
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: UserId,
        email: &str,
        tenant_id: TenantId,
        role: Role,
        token_id: Uuid,
    ) -> Result<String, JwtError> {
        let claims = Self::claims_for(
            user_id,
            email,
            tenant_id,
            role,
            token_id,
            SESSION_TTL_SECONDS,
        );
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.access_secret),
        )
        .map_err(JwtError::Encode)
    }

    pub fn generate_refresh_token(
        &self,
        user_id: UserId,
        email: &str,
        tenant_id: TenantId,
        role: Role,
        token_id: Uuid,
    ) -> Result<String, JwtError> {
        let claims = Self::claims_for(
            user_id,
            email,
            tenant_id,
            role,
            token_id,
            SESSION_TTL_SECONDS,
        );
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.refresh_secret),
        )
        .map_err(JwtError::Encode)
    }

    pub fn parse_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.access_secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(JwtError::Invalid)
    }

    pub fn parse_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.refresh_secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(JwtError::Invalid)
    }

    /// Strips the `Bearer ` prefix from an `Authorization` header value.
    pub fn extract_bearer(auth_header: &str) -> Option<&str> {
        auth_header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_access_token() {
        let mgr = JwtManager::new("access-secret", "refresh-secret");
        let user_id = UserId::new();
        let tenant_id = TenantId::new();
        let token_id = Uuid::new_v4();

        let token = mgr
            .generate_access_token(user_id, "a@b.com", tenant_id, Role::User, token_id)
            .unwrap();

        let claims = mgr.parse_access_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tenant_id, tenant_id);
        assert_eq!(claims.jti, token_id);
    }

    #[test]
    fn rejects_access_token_under_refresh_secret() {
        let mgr = JwtManager::new("access-secret", "refresh-secret");
        let token = mgr
            .generate_access_token(
                UserId::new(),
                "a@b.com",
                TenantId::new(),
                Role::User,
                Uuid::new_v4(),
            )
            .unwrap();

        assert!(mgr.parse_refresh_token(&token).is_err());
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            JwtManager::extract_bearer("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtManager::extract_bearer("abc.def.ghi"), None);
    }
}
