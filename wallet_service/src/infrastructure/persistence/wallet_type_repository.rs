use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::WalletType;
use crate::domain::error::WalletTypeError;
use crate::domain::repository::WalletTypeRepository;
use crate::infrastructure::persistence::models::WalletTypeModel;

pub struct PostgresWalletTypeRepository {
    pool: PgPool,
}

impl PostgresWalletTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletTypeRepository for PostgresWalletTypeRepository {
    async fn list_active(&self) -> Result<Vec<WalletType>, WalletTypeError> {
        let models = sqlx::query_as::<_, WalletTypeModel>(
            "SELECT * FROM wallet_types WHERE active = true ORDER BY currency_code ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WalletTypeError::Repository(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_currency(
        &self,
        currency_code: &str,
    ) -> Result<Option<WalletType>, WalletTypeError> {
        let model = sqlx::query_as::<_, WalletTypeModel>(
            "SELECT * FROM wallet_types WHERE currency_code = $1",
        )
        .bind(currency_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WalletTypeError::Repository(e.to_string()))?;

        Ok(model.map(Into::into))
    }
}
