use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::error::WebhookError;
use crate::domain::repository::TenantLookupRepository;
use crate::domain::types::TenantId;

/// Reads the `tenants` table wallet_service migrates, across the database
/// boundary the two services share.
pub struct PostgresTenantLookupRepository {
    pool: PgPool,
}

impl PostgresTenantLookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantLookupRepository for PostgresTenantLookupRepository {
    async fn find_webhook_url(&self, tenant_id: TenantId) -> Result<Option<String>, WebhookError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT webhook_url FROM tenants WHERE id = $1")
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| WebhookError::Repository(e.to_string()))?;
        Ok(row.and_then(|(url,)| url))
    }
}
