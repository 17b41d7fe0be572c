use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::Transaction;
use crate::domain::error::TransactionError;
use crate::domain::repository::TransactionRepository;
use crate::domain::types::{TenantId, TransactionId, TransactionStatus, WalletId};
use crate::infrastructure::persistence::models::TransactionModel;

pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, TransactionError> {
        let model = sqlx::query_as::<_, TransactionModel>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TransactionError::Repository(e.to_string()))?;
        Ok(model.map(Into::into))
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, TransactionError> {
        let model = sqlx::query_as::<_, TransactionModel>(
            "SELECT * FROM transactions WHERE reference = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TransactionError::Repository(e.to_string()))?;
        Ok(model.map(Into::into))
    }

    async fn list_for_wallets(
        &self,
        wallet_ids: &[WalletId],
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let ids: Vec<uuid::Uuid> = wallet_ids.iter().map(|w| w.0).collect();
        let models = sqlx::query_as::<_, TransactionModel>(
            r#"
            SELECT * FROM transactions
            WHERE wallet_id = ANY($1)
              AND ($2::transaction_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(ids)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TransactionError::Repository(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let models = sqlx::query_as::<_, TransactionModel>(
            r#"
            SELECT * FROM transactions
            WHERE tenant_id = $1
              AND ($2::transaction_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TransactionError::Repository(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
