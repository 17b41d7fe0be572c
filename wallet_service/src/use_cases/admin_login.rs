use std::sync::Arc;

use common::jwt::{JwtManager, SESSION_TTL_SECONDS};
use uuid::Uuid;

use crate::domain::cache::{Session, SessionStore};
use crate::domain::error::AuthError;
use crate::domain::repository::UserRepository;
use crate::domain::types::Role;
use crate::infrastructure::password::verify_password;
use crate::use_cases::auth_types::AuthTokens;

/// `/auth/admin`: tenant-agnostic credential check restricted to
/// `PLATFORM_ADMIN` rows.
#[derive(Clone)]
pub struct AdminLoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    jwt: Arc<JwtManager>,
}

impl AdminLoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_store: Arc<dyn SessionStore>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self {
            user_repo,
            session_store,
            jwt,
        }
    }

    #[tracing::instrument(name = "AdminLoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        email: String,
        password: String,
    ) -> Result<AuthTokens, AuthError> {
        let user = self
            .user_repo
            .find_platform_admin_by_email(&email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.role != Role::PlatformAdmin {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.active || !verify_password(&password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token_id = Uuid::new_v4();
        let access_token = self
            .jwt
            .generate_access_token(user.id, &user.email, user.tenant_id, user.role, token_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user.id, &user.email, user.tenant_id, user.role, token_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let session = Session::new(token_id.into(), user.id, None, None);
        self.session_store
            .set_session(&session, SESSION_TTL_SECONDS)
            .await
            .map_err(|e| AuthError::Cache(e.to_string()))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockSessionStore;
    use crate::domain::entities::User;
    use crate::domain::repository::MockUserRepository;
    use crate::domain::types::TenantId;
    use crate::infrastructure::password::hash_password;

    #[tokio::test]
    async fn rejects_non_admin_role() {
        let hash = hash_password("correcthorse").unwrap();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_platform_admin_by_email()
            .times(1)
            .returning(move |email| {
                Ok(Some(
                    User::new(TenantId::new(), email.to_string(), None, hash.clone(), Role::User)
                        .unwrap(),
                ))
            });

        let use_case = AdminLoginUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockSessionStore::new()),
            Arc::new(JwtManager::new("a", "r")),
        );

        let result = use_case
            .execute("a@b.com".into(), "correcthorse".into())
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
