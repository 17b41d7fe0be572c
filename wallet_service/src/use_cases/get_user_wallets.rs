use std::sync::Arc;

use crate::domain::entities::Wallet;
use crate::domain::error::WalletError;
use crate::domain::repository::WalletRepository;
use crate::domain::types::UserId;

/// `GET /wallets` (own wallets) and the admin wallet listing: all balances
/// for one user, one row per currency.
#[derive(Clone)]
pub struct GetWalletsUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
}

impl GetWalletsUseCase {
    pub fn new(wallet_repo: Arc<dyn WalletRepository>) -> Self {
        Self { wallet_repo }
    }

    #[tracing::instrument(name = "GetWalletsUseCase::execute", skip(self))]
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<Wallet>, WalletError> {
        self.wallet_repo.find_by_user_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockWalletRepository;
    use crate::domain::types::WalletId;
    use rust_decimal_macros::dec;

    fn sample_wallet(user_id: UserId, currency: &str) -> Wallet {
        Wallet {
            id: WalletId::new(),
            user_id,
            wallet_type_id: crate::domain::types::WalletTypeId::new(),
            currency_code: currency.into(),
            balance: dec!(0),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_wallets_empty() {
        let mut mock_repo = MockWalletRepository::new();
        let user_id = UserId::new();

        mock_repo
            .expect_find_by_user_id()
            .with(mockall::predicate::eq(user_id))
            .times(1)
            .returning(|_| Ok(vec![]));

        let use_case = GetWalletsUseCase::new(Arc::new(mock_repo));
        let wallets = use_case.execute(user_id).await.unwrap();

        assert!(wallets.is_empty());
    }

    #[tokio::test]
    async fn get_wallets_returns_one_row_per_currency() {
        let mut mock_repo = MockWalletRepository::new();
        let user_id = UserId::new();

        mock_repo
            .expect_find_by_user_id()
            .with(mockall::predicate::eq(user_id))
            .times(1)
            .returning(move |_| Ok(vec![sample_wallet(user_id, "USD"), sample_wallet(user_id, "NGN")]));

        let use_case = GetWalletsUseCase::new(Arc::new(mock_repo));
        let wallets = use_case.execute(user_id).await.unwrap();

        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].currency_code, "USD");
        assert_eq!(wallets[1].currency_code, "NGN");
    }
}
