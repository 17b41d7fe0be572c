use std::sync::Arc;

use common::jwt::Principal;

use crate::domain::cache::SessionStore;
use crate::domain::error::AuthError;

/// `/auth/logout`: deletes the caller's session row. Idempotent — logging
/// out twice is not an error.
#[derive(Clone)]
pub struct LogoutUseCase {
    session_store: Arc<dyn SessionStore>,
}

impl LogoutUseCase {
    pub fn new(session_store: Arc<dyn SessionStore>) -> Self {
        Self { session_store }
    }

    #[tracing::instrument(name = "LogoutUseCase::execute", skip(self))]
    pub async fn execute(&self, principal: &Principal) -> Result<(), AuthError> {
        self.session_store
            .delete_session(principal.token_id.into())
            .await
            .map_err(|e| AuthError::Cache(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockSessionStore;
    use crate::domain::types::{Role, TenantId, UserId};

    #[tokio::test]
    async fn logout_deletes_session() {
        let mut session_store = MockSessionStore::new();
        session_store.expect_delete_session().times(1).returning(|_| Ok(()));

        let use_case = LogoutUseCase::new(Arc::new(session_store));
        let principal = Principal {
            user_id: UserId::new(),
            tenant_id: TenantId::new(),
            role: Role::User,
            token_id: uuid::Uuid::new_v4(),
        };

        let result = use_case.execute(&principal).await;
        assert!(result.is_ok());
    }
}
