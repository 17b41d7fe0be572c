use std::sync::Arc;

use common::jwt::JwtManager;
use uuid::Uuid;

use crate::domain::cache::{Session, SessionStore};
use crate::domain::error::AuthError;
use crate::domain::repository::UserRepository;
use crate::domain::types::TenantId;
use crate::infrastructure::password::verify_password;
use crate::use_cases::auth_types::AuthTokens;

use common::jwt::SESSION_TTL_SECONDS;

/// `/auth/login`: tenant-scoped credential check, one active session per
/// user (C1's login invariant lives in the `SessionStore` impl itself).
#[derive(Clone)]
pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    jwt: Arc<JwtManager>,
}

impl LoginUseCase {
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

    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        email: String,
        password: String,
        user_agent: Option<String>,
        ip: Option<String>,
    ) -> Result<AuthTokens, AuthError> {
        let user = self
            .user_repo
            .find_by_tenant_and_email(tenant_id, &email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.active {
            return Err(AuthError::InvalidCredentials);
        }
        if !verify_password(&password, &user.password_hash) {
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

        let session = Session::new(token_id.into(), user.id, user_agent, ip);
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
    use crate::domain::types::Role;
    use crate::infrastructure::password::hash_password;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new("access-secret", "refresh-secret"))
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let tenant_id = TenantId::new();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_tenant_and_email()
            .times(1)
            .returning(|_, _| Ok(None));

        let use_case = LoginUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockSessionStore::new()),
            jwt(),
        );

        let result = use_case
            .execute(tenant_id, "nope@b.com".into(), "whatever".into(), None, None)
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_succeeds_and_writes_session() {
        let tenant_id = TenantId::new();
        let hash = hash_password("correcthorse").unwrap();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_tenant_and_email()
            .times(1)
            .returning(move |tid, email| {
                Ok(Some(
                    User::new(tid, email.to_string(), None, hash.clone(), Role::User).unwrap(),
                ))
            });

        let mut session_store = MockSessionStore::new();
        session_store.expect_set_session().times(1).returning(|_, _| Ok(()));

        let use_case = LoginUseCase::new(Arc::new(user_repo), Arc::new(session_store), jwt());

        let result = use_case
            .execute(
                tenant_id,
                "a@b.com".into(),
                "correcthorse".into(),
                Some("curl/8".into()),
                Some("127.0.0.1".into()),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let tenant_id = TenantId::new();
        let hash = hash_password("correcthorse").unwrap();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_tenant_and_email()
            .times(1)
            .returning(move |tid, email| {
                Ok(Some(
                    User::new(tid, email.to_string(), None, hash.clone(), Role::User).unwrap(),
                ))
            });

        let use_case = LoginUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockSessionStore::new()),
            jwt(),
        );

        let result = use_case
            .execute(tenant_id, "a@b.com".into(), "wrong-password".into(), None, None)
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
