use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::entities::Transaction;
use crate::domain::error::WalletError;
use crate::domain::repository::{LedgerRepository, UserRepository, WalletRepository};
use crate::domain::types::{TenantId, UserId, WalletId};

/// §4.6.3: same-tenant transfer. Lock ordering happens inside
/// `LedgerRepository::transfer`; this use case owns input validation plus
/// the ownership/tenant checks the locked transaction itself can't express.
#[derive(Clone)]
pub struct TransferUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    user_repo: Arc<dyn UserRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
}

impl TransferUseCase {
    pub fn new(
        wallet_repo: Arc<dyn WalletRepository>,
        user_repo: Arc<dyn UserRepository>,
        ledger_repo: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            wallet_repo,
            user_repo,
            ledger_repo,
        }
    }

    #[tracing::instrument(name = "TransferUseCase::execute", skip(self, metadata))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        caller_id: UserId,
        from_wallet_id: WalletId,
        to_wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<Transaction, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount("amount must be positive".into()));
        }
        if from_wallet_id == to_wallet_id {
            return Err(WalletError::SameWallet(from_wallet_id));
        }

        let from_wallet = self
            .wallet_repo
            .find_by_id(from_wallet_id)
            .await?
            .ok_or(WalletError::NotFound(from_wallet_id))?;
        if from_wallet.user_id != caller_id {
            return Err(WalletError::Forbidden(from_wallet_id));
        }

        let to_wallet = self
            .wallet_repo
            .find_by_id(to_wallet_id)
            .await?
            .ok_or(WalletError::NotFound(to_wallet_id))?;
        let to_owner = self
            .user_repo
            .find_by_id(to_wallet.user_id)
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?
            .ok_or(WalletError::NotFound(to_wallet_id))?;
        if to_owner.tenant_id != tenant_id {
            return Err(WalletError::Forbidden(to_wallet_id));
        }

        self.ledger_repo
            .transfer(tenant_id, from_wallet_id, to_wallet_id, amount, metadata)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{User, Wallet};
    use crate::domain::repository::{MockLedgerRepository, MockUserRepository, MockWalletRepository};
    use crate::domain::types::{Role, WalletTypeId};
    use rust_decimal_macros::dec;

    fn wallet_owned_by(user_id: UserId) -> Wallet {
        Wallet::new_zero_balance(user_id, WalletTypeId::new(), "USD".into()).unwrap()
    }

    fn user_in_tenant(tenant_id: TenantId) -> User {
        User::new(tenant_id, "user@example.com".into(), None, "hash".into(), Role::User).unwrap()
    }

    fn new_use_case(
        wallet_repo: MockWalletRepository,
        user_repo: MockUserRepository,
        ledger_repo: MockLedgerRepository,
    ) -> TransferUseCase {
        TransferUseCase::new(Arc::new(wallet_repo), Arc::new(user_repo), Arc::new(ledger_repo))
    }

    #[tokio::test]
    async fn rejects_same_wallet() {
        let wallet_id = WalletId::new();
        let use_case = new_use_case(
            MockWalletRepository::new(),
            MockUserRepository::new(),
            MockLedgerRepository::new(),
        );

        let result = use_case
            .execute(TenantId::new(), UserId::new(), wallet_id, wallet_id, dec!(5), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::SameWallet(id)) if id == wallet_id));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let use_case = new_use_case(
            MockWalletRepository::new(),
            MockUserRepository::new(),
            MockLedgerRepository::new(),
        );

        let result = use_case
            .execute(
                TenantId::new(),
                UserId::new(),
                WalletId::new(),
                WalletId::new(),
                dec!(0),
                Value::Null,
            )
            .await;

        assert!(matches!(result, Err(WalletError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn rejects_transfer_from_wallet_caller_does_not_own() {
        let caller_id = UserId::new();
        let from_wallet = wallet_owned_by(UserId::new());
        let from_wallet_id = from_wallet.id;
        let to_wallet_id = WalletId::new();

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(from_wallet.clone())));

        let use_case = new_use_case(wallet_repo, MockUserRepository::new(), MockLedgerRepository::new());
        let result = use_case
            .execute(TenantId::new(), caller_id, from_wallet_id, to_wallet_id, dec!(5), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::Forbidden(id)) if id == from_wallet_id));
    }

    #[tokio::test]
    async fn rejects_transfer_into_a_wallet_owned_by_another_tenant() {
        let tenant_id = TenantId::new();
        let caller_id = UserId::new();
        let from_wallet = wallet_owned_by(caller_id);
        let from_wallet_id = from_wallet.id;
        let to_wallet = wallet_owned_by(UserId::new());
        let to_wallet_id = to_wallet.id;
        let to_owner = user_in_tenant(TenantId::new());

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(from_wallet.clone())));
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(to_wallet.clone())));

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(to_owner.clone())));

        let use_case = new_use_case(wallet_repo, user_repo, MockLedgerRepository::new());
        let result = use_case
            .execute(tenant_id, caller_id, from_wallet_id, to_wallet_id, dec!(5), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::Forbidden(id)) if id == to_wallet_id));
    }
}
