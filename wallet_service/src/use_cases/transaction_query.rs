use std::sync::Arc;

use common::role::Role;

use crate::domain::entities::Transaction;
use crate::domain::error::TransactionError;
use crate::domain::repository::{TransactionRepository, WalletRepository};
use crate::domain::types::{TenantId, TransactionId, TransactionStatus, UserId};

/// `GET /transactions/:id`: any authenticated principal may call this, but
/// only the owning user (or an admin role) may see the result.
#[derive(Clone)]
pub struct GetTransactionUseCase {
    transaction_repo: Arc<dyn TransactionRepository>,
    wallet_repo: Arc<dyn WalletRepository>,
}

impl GetTransactionUseCase {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepository>,
        wallet_repo: Arc<dyn WalletRepository>,
    ) -> Self {
        Self {
            transaction_repo,
            wallet_repo,
        }
    }

    #[tracing::instrument(name = "GetTransactionUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        id: TransactionId,
        caller_id: UserId,
        caller_role: Role,
    ) -> Result<Transaction, TransactionError> {
        let transaction = self
            .transaction_repo
            .find_by_id(id)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        if caller_role == Role::User {
            let wallet = self
                .wallet_repo
                .find_by_id(transaction.wallet_id)
                .await
                .map_err(|e| TransactionError::Repository(e.to_string()))?
                .ok_or(TransactionError::NotFound(id))?;
            if wallet.user_id != caller_id {
                return Err(TransactionError::Forbidden);
            }
        }

        Ok(transaction)
    }
}

/// `GET /transactions`: `USER` sees only their own wallets' rows; `TENANT_ADMIN`
/// and `PLATFORM_ADMIN` see every transaction under the caller's tenant (§6).
#[derive(Clone)]
pub struct ListTransactionsUseCase {
    transaction_repo: Arc<dyn TransactionRepository>,
    wallet_repo: Arc<dyn WalletRepository>,
}

impl ListTransactionsUseCase {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepository>,
        wallet_repo: Arc<dyn WalletRepository>,
    ) -> Self {
        Self {
            transaction_repo,
            wallet_repo,
        }
    }

    #[tracing::instrument(name = "ListTransactionsUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        caller_id: UserId,
        caller_role: Role,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError> {
        if caller_role != Role::User {
            return self
                .transaction_repo
                .list_for_tenant(tenant_id, status, limit, offset)
                .await;
        }

        let wallets = self
            .wallet_repo
            .find_by_user_id(caller_id)
            .await
            .map_err(|e| TransactionError::Repository(e.to_string()))?;
        let wallet_ids: Vec<_> = wallets.into_iter().map(|w| w.id).collect();

        self.transaction_repo
            .list_for_wallets(&wallet_ids, status, limit, offset)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Wallet;
    use crate::domain::repository::{MockTransactionRepository, MockWalletRepository};
    use crate::domain::types::{ProviderId, TenantId, TransactionType, WalletId, WalletTypeId};
    use rust_decimal_macros::dec;

    fn sample_transaction(id: TransactionId, wallet_id: WalletId) -> Transaction {
        Transaction {
            id,
            tenant_id: TenantId::new(),
            wallet_id,
            provider_id: Some(ProviderId::new()),
            currency_code: "NGN".into(),
            reference: "ref-1".into(),
            transaction_type: TransactionType::Deposit,
            status: TransactionStatus::Completed,
            amount: dec!(1000),
            fee: dec!(0),
            metadata: serde_json::Value::Null,
            error_reason: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn sample_wallet(id: WalletId, user_id: UserId) -> Wallet {
        Wallet {
            id,
            user_id,
            wallet_type_id: WalletTypeId::new(),
            currency_code: "NGN".into(),
            balance: dec!(1000),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_transaction_forbidden_for_other_user() {
        let txn_id = TransactionId::new();
        let wallet_id = WalletId::new();
        let owner = UserId::new();
        let caller = UserId::new();

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(sample_transaction(txn_id, wallet_id))));

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(sample_wallet(wallet_id, owner))));

        let use_case = GetTransactionUseCase::new(Arc::new(transaction_repo), Arc::new(wallet_repo));
        let result = use_case.execute(txn_id, caller, Role::User).await;

        assert!(matches!(result, Err(TransactionError::Forbidden)));
    }

    #[tokio::test]
    async fn get_transaction_allows_owner() {
        let txn_id = TransactionId::new();
        let wallet_id = WalletId::new();
        let owner = UserId::new();

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(sample_transaction(txn_id, wallet_id))));

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(sample_wallet(wallet_id, owner))));

        let use_case = GetTransactionUseCase::new(Arc::new(transaction_repo), Arc::new(wallet_repo));
        let transaction = use_case.execute(txn_id, owner, Role::User).await.unwrap();

        assert_eq!(transaction.id, txn_id);
    }

    #[tokio::test]
    async fn list_transactions_scopes_by_caller_wallets_for_user_role() {
        let tenant_id = TenantId::new();
        let caller = UserId::new();
        let wallet_id = WalletId::new();

        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_user_id()
            .times(1)
            .returning(move |_| Ok(vec![sample_wallet(wallet_id, caller)]));

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_list_for_wallets()
            .withf(move |ids, _, _, _| ids == [wallet_id])
            .times(1)
            .returning(move |_, _, _, _| Ok(vec![sample_transaction(TransactionId::new(), wallet_id)]));

        let use_case = ListTransactionsUseCase::new(Arc::new(transaction_repo), Arc::new(wallet_repo));
        let transactions = use_case
            .execute(tenant_id, caller, Role::User, None, 20, 0)
            .await
            .unwrap();

        assert_eq!(transactions.len(), 1);
    }

    #[tokio::test]
    async fn list_transactions_scopes_by_tenant_for_admin_roles() {
        let tenant_id = TenantId::new();
        let caller = UserId::new();
        let wallet_id = WalletId::new();

        let wallet_repo = MockWalletRepository::new();

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_list_for_tenant()
            .withf(move |tid, _, _, _| *tid == tenant_id)
            .times(1)
            .returning(move |_, _, _, _| Ok(vec![sample_transaction(TransactionId::new(), wallet_id)]));

        let use_case = ListTransactionsUseCase::new(Arc::new(transaction_repo), Arc::new(wallet_repo));
        let transactions = use_case
            .execute(tenant_id, caller, Role::TenantAdmin, None, 20, 0)
            .await
            .unwrap();

        assert_eq!(transactions.len(), 1);
    }
}
