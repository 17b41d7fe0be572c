use std::sync::Arc;

use crate::domain::entities::Wallet;
use crate::domain::error::WalletError;
use crate::domain::repository::WalletRepository;
use crate::domain::types::WalletId;

/// Fetches a single wallet by id, for the `GET /transactions/:id`-adjacent
/// detail views that need to resolve a wallet's current balance.
#[derive(Clone)]
pub struct GetWalletUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
}

impl GetWalletUseCase {
    pub fn new(wallet_repo: Arc<dyn WalletRepository>) -> Self {
        Self { wallet_repo }
    }

    #[tracing::instrument(name = "GetWalletUseCase::execute", skip(self))]
    pub async fn execute(&self, wallet_id: WalletId) -> Result<Wallet, WalletError> {
        self.wallet_repo
            .find_by_id(wallet_id)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockWalletRepository;
    use crate::domain::types::{UserId, WalletTypeId};
    use rust_decimal_macros::dec;

    fn sample_wallet(id: WalletId) -> Wallet {
        Wallet {
            id,
            user_id: UserId::new(),
            wallet_type_id: WalletTypeId::new(),
            currency_code: "USD".into(),
            balance: dec!(0),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_wallet_returns_wallet() {
        let wallet_id = WalletId::new();
        let mut mock_repo = MockWalletRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq(wallet_id))
            .times(1)
            .returning(move |id| Ok(Some(sample_wallet(id))));

        let use_case = GetWalletUseCase::new(Arc::new(mock_repo));
        let wallet = use_case.execute(wallet_id).await.unwrap();

        assert_eq!(wallet.id, wallet_id);
        assert_eq!(wallet.currency_code, "USD");
    }

    #[tokio::test]
    async fn get_wallet_not_found() {
        let wallet_id = WalletId::new();
        let mut mock_repo = MockWalletRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq(wallet_id))
            .times(1)
            .returning(|_| Ok(None));

        let use_case = GetWalletUseCase::new(Arc::new(mock_repo));
        let result = use_case.execute(wallet_id).await;

        assert!(matches!(result, Err(WalletError::NotFound(id)) if id == wallet_id));
    }
}
