use crate::domain::entities::{Wallet, WalletType};
use crate::domain::error::WalletError;
use crate::domain::repository::WalletRepository;
use crate::domain::types::{UserId, WalletId};
use crate::infrastructure::persistence::models::WalletModel;
use async_trait::async_trait;
use sqlx::PgPool;

/// Repositorio de Billeteras basado en PostgreSQL.
///
/// Balance mutation lives on `LedgerRepository` now — this repository only
/// covers the read/creation paths that don't need a row lock.
pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn find_by_id(&self, id: WalletId) -> Result<Option<Wallet>, WalletError> {
        let model_opt = sqlx::query_as::<_, WalletModel>(
            r#"
            SELECT * FROM wallets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(model_opt.map(|m| m.into()))
    }

    async fn find_by_user_and_currency(
        &self,
        user_id: UserId,
        currency_code: &str,
    ) -> Result<Option<Wallet>, WalletError> {
        let model_opt = sqlx::query_as::<_, WalletModel>(
            r#"
            SELECT * FROM wallets
            WHERE user_id = $1 AND currency_code = $2
            "#,
        )
        .bind(user_id)
        .bind(currency_code.to_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(model_opt.map(|m| m.into()))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Wallet>, WalletError> {
        let models = sqlx::query_as::<_, WalletModel>(
            r#"
            SELECT * FROM wallets
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Creates one zero-balance wallet per active wallet type, inside a
    /// single transaction — used once at signup.
    async fn create_wallets_for_new_user(
        &self,
        user_id: UserId,
        wallet_types: &[WalletType],
    ) -> Result<Vec<Wallet>, WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        let mut created = Vec::with_capacity(wallet_types.len());
        for wallet_type in wallet_types {
            if !wallet_type.active {
                continue;
            }
            let wallet =
                Wallet::new_zero_balance(user_id, wallet_type.id, wallet_type.currency_code.clone())?;
            let model = WalletModel::from(wallet);

            let saved = sqlx::query_as::<_, WalletModel>(
                r#"
                INSERT INTO wallets (
                    id, user_id, wallet_type_id, currency_code, balance, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(model.id)
            .bind(model.user_id)
            .bind(model.wallet_type_id)
            .bind(model.currency_code)
            .bind(model.balance)
            .bind(model.created_at)
            .bind(model.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

            created.push(saved.into());
        }

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(created)
    }
}
