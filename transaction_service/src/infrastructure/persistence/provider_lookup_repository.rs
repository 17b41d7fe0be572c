use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::error::WebhookError;
use crate::domain::repository::ProviderLookupRepository;
use crate::domain::types::ProviderId;

/// Reads the `providers` table wallet_service migrates, across the database
/// boundary the two services share.
pub struct PostgresProviderLookupRepository {
    pool: PgPool,
}

impl PostgresProviderLookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderLookupRepository for PostgresProviderLookupRepository {
    async fn find_id_by_code(&self, code: &str) -> Result<Option<ProviderId>, WebhookError> {
        let id: Option<(ProviderId,)> =
            sqlx::query_as("SELECT id FROM providers WHERE code = $1")
                .bind(code.to_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| WebhookError::Repository(e.to_string()))?;
        Ok(id.map(|(id,)| id))
    }
}
