use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::error::UserError;
use crate::domain::repository::{UserRepository, WalletRepository, WalletTypeRepository};
use crate::domain::types::{Role, TenantId};
use crate::infrastructure::password::hash_password;

/// `/auth/signup`: a `TENANT_ADMIN` provisions a new `USER` in their own
/// tenant. On success, materializes one zero-balance wallet per active
/// wallet type — the signup-time hook the ledger repository exposes for.
#[derive(Clone)]
pub struct SignupUseCase {
    user_repo: Arc<dyn UserRepository>,
    wallet_repo: Arc<dyn WalletRepository>,
    wallet_type_repo: Arc<dyn WalletTypeRepository>,
}

impl SignupUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        wallet_repo: Arc<dyn WalletRepository>,
        wallet_type_repo: Arc<dyn WalletTypeRepository>,
    ) -> Self {
        Self {
            user_repo,
            wallet_repo,
            wallet_type_repo,
        }
    }

    #[tracing::instrument(name = "SignupUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        email: String,
        phone: Option<String>,
        password: String,
    ) -> Result<User, UserError> {
        if password.len() < 8 {
            return Err(UserError::InvalidData(
                "password must be at least 8 characters".into(),
            ));
        }

        if self
            .user_repo
            .find_by_tenant_and_email(tenant_id, &email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailTaken(email));
        }

        let password_hash = hash_password(&password)
            .map_err(|e| UserError::Repository(e.to_string()))?;
        let user = User::new(tenant_id, email, phone, password_hash, Role::User)?;
        let created = self.user_repo.create(user).await?;

        let wallet_types = self
            .wallet_type_repo
            .list_active()
            .await
            .map_err(|e| UserError::Repository(e.to_string()))?;
        self.wallet_repo
            .create_wallets_for_new_user(created.id, &wallet_types)
            .await
            .map_err(|e| UserError::Repository(e.to_string()))?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::WalletType;
    use crate::domain::repository::{MockUserRepository, MockWalletRepository, MockWalletTypeRepository};
    use crate::domain::types::WalletTypeId;

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let use_case = SignupUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockWalletRepository::new()),
            Arc::new(MockWalletTypeRepository::new()),
        );

        let result = use_case
            .execute(TenantId::new(), "a@b.com".into(), None, "short".into())
            .await;

        assert!(matches!(result, Err(UserError::InvalidData(_))));
    }

    #[tokio::test]
    async fn signup_rejects_taken_email() {
        let tenant_id = TenantId::new();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_tenant_and_email()
            .times(1)
            .returning(move |_, email| {
                Ok(Some(
                    User::new(tenant_id, email.to_string(), None, "hash".into(), Role::User)
                        .unwrap(),
                ))
            });

        let use_case = SignupUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockWalletRepository::new()),
            Arc::new(MockWalletTypeRepository::new()),
        );

        let result = use_case
            .execute(tenant_id, "a@b.com".into(), None, "longenough".into())
            .await;

        assert!(matches!(result, Err(UserError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn signup_creates_user_and_wallets() {
        let tenant_id = TenantId::new();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_tenant_and_email()
            .times(1)
            .returning(|_, _| Ok(None));
        user_repo.expect_create().times(1).returning(Ok);

        let mut wallet_type_repo = MockWalletTypeRepository::new();
        wallet_type_repo.expect_list_active().times(1).returning(|| {
            Ok(vec![WalletType {
                id: WalletTypeId::new(),
                currency_code: "NGN".into(),
                active: true,
            }])
        });

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_create_wallets_for_new_user()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let use_case = SignupUseCase::new(
            Arc::new(user_repo),
            Arc::new(wallet_repo),
            Arc::new(wallet_type_repo),
        );

        let result = use_case
            .execute(tenant_id, "a@b.com".into(), None, "longenough".into())
            .await;

        assert!(result.is_ok());
    }
}
