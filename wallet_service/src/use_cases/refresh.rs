use std::sync::Arc;

use common::jwt::{JwtManager, SESSION_TTL_SECONDS};
use uuid::Uuid;

use crate::domain::cache::{Session, SessionStore};
use crate::domain::error::AuthError;
use crate::domain::repository::UserRepository;
use crate::use_cases::auth_types::AuthTokens;

/// `/auth/refresh`: verifies the refresh token under its own secret, then
/// re-issues a fresh (access, refresh) pair under a brand new `token-id` —
/// the old session row is replaced, not extended.
#[derive(Clone)]
pub struct RefreshUseCase {
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    jwt: Arc<JwtManager>,
}

impl RefreshUseCase {
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

    #[tracing::instrument(name = "RefreshUseCase::execute", skip(self, refresh_token))]
    pub async fn execute(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let claims = self
            .jwt
            .parse_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;
        if !user.active {
            return Err(AuthError::InvalidToken);
        }

        let new_token_id = Uuid::new_v4();
        let access_token = self
            .jwt
            .generate_access_token(user.id, &user.email, user.tenant_id, user.role, new_token_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user.id, &user.email, user.tenant_id, user.role, new_token_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let session = Session::new(new_token_id.into(), user.id, None, None);
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
    use crate::domain::types::{Role, TenantId};

    #[tokio::test]
    async fn refresh_rejects_garbage_token() {
        let use_case = RefreshUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionStore::new()),
            Arc::new(JwtManager::new("a", "r")),
        );

        let result = use_case.execute("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn refresh_rejects_access_token_used_as_refresh() {
        let jwt = Arc::new(JwtManager::new("a", "r"));
        let user_id = crate::domain::types::UserId::new();
        let tenant_id = TenantId::new();
        let access = jwt
            .generate_access_token(user_id, "a@b.com", tenant_id, Role::User, Uuid::new_v4())
            .unwrap();

        let use_case = RefreshUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionStore::new()),
            jwt,
        );

        let result = use_case.execute(&access).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn refresh_issues_new_pair_for_active_user() {
        let jwt = Arc::new(JwtManager::new("a", "r"));
        let user_id = crate::domain::types::UserId::new();
        let tenant_id = TenantId::new();
        let refresh = jwt
            .generate_refresh_token(user_id, "a@b.com", tenant_id, Role::User, Uuid::new_v4())
            .unwrap();

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().times(1).returning(move |_| {
            Ok(Some(
                User::new(tenant_id, "a@b.com".into(), None, "hash".into(), Role::User).unwrap(),
            ))
        });

        let mut session_store = MockSessionStore::new();
        session_store.expect_set_session().times(1).returning(|_, _| Ok(()));

        let use_case = RefreshUseCase::new(Arc::new(user_repo), Arc::new(session_store), jwt);
        let result = use_case.execute(&refresh).await;
        assert!(result.is_ok());
    }
}
