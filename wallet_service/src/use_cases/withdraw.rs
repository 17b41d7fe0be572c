use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::entities::Transaction;
use crate::domain::error::WalletError;
use crate::domain::repository::{LedgerRepository, WalletRepository};
use crate::domain::types::{TenantId, UserId, WalletId};

/// §4.6.2: a purely internal debit. No provider is called — see
/// SPEC_FULL.md's note on the withdrawal external leg being future work.
#[derive(Clone)]
pub struct WithdrawUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
}

impl WithdrawUseCase {
    pub fn new(wallet_repo: Arc<dyn WalletRepository>, ledger_repo: Arc<dyn LedgerRepository>) -> Self {
        Self {
            wallet_repo,
            ledger_repo,
        }
    }

    #[tracing::instrument(name = "WithdrawUseCase::execute", skip(self, metadata))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        caller_id: UserId,
        wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<Transaction, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount("amount must be positive".into()));
        }

        let wallet = self
            .wallet_repo
            .find_by_id(wallet_id)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))?;
        if wallet.user_id != caller_id {
            return Err(WalletError::Forbidden(wallet_id));
        }

        let (transaction, _withdrawal) = self
            .ledger_repo
            .withdraw(tenant_id, wallet_id, amount, metadata)
            .await?;

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Wallet;
    use crate::domain::repository::{MockLedgerRepository, MockWalletRepository};
    use crate::domain::types::WalletTypeId;
    use rust_decimal_macros::dec;

    fn wallet_owned_by(user_id: UserId) -> Wallet {
        Wallet::new_zero_balance(user_id, WalletTypeId::new(), "USD".into()).unwrap()
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let use_case = WithdrawUseCase::new(
            Arc::new(MockWalletRepository::new()),
            Arc::new(MockLedgerRepository::new()),
        );

        let result = use_case
            .execute(TenantId::new(), UserId::new(), WalletId::new(), dec!(-1), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn rejects_withdrawal_from_wallet_caller_does_not_own() {
        let caller_id = UserId::new();
        let wallet = wallet_owned_by(UserId::new());
        let wallet_id = wallet.id;

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(wallet.clone())));

        let use_case = WithdrawUseCase::new(Arc::new(wallet_repo), Arc::new(MockLedgerRepository::new()));
        let result = use_case
            .execute(TenantId::new(), caller_id, wallet_id, dec!(10), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::Forbidden(id)) if id == wallet_id));
    }

    #[tokio::test]
    async fn propagates_insufficient_balance() {
        let caller_id = UserId::new();
        let wallet = wallet_owned_by(caller_id);
        let wallet_id = wallet.id;

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(wallet.clone())));

        let mut ledger_repo = MockLedgerRepository::new();
        ledger_repo
            .expect_withdraw()
            .times(1)
            .returning(move |_, id, _, _| Err(WalletError::InsufficientBalance(id)));

        let use_case = WithdrawUseCase::new(Arc::new(wallet_repo), Arc::new(ledger_repo));
        let result = use_case
            .execute(TenantId::new(), caller_id, wallet_id, dec!(10), Value::Null)
            .await;

        assert!(matches!(result, Err(WalletError::InsufficientBalance(id)) if id == wallet_id));
    }
}
