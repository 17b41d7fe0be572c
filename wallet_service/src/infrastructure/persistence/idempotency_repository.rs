use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::domain::entities::IdempotencyKey;
use crate::domain::error::IdempotencyError;
use crate::domain::repository::IdempotencyRepository;
use crate::domain::types::{IdempotencyKeyId, TenantId, UserId};
use crate::infrastructure::persistence::models::IdempotencyKeyModel;

pub struct PostgresIdempotencyRepository {
    pool: PgPool,
}

impl PostgresIdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdempotencyRepository for PostgresIdempotencyRepository {
    async fn find(
        &self,
        tenant_id: TenantId,
        key: &str,
        endpoint: &str,
    ) -> Result<Option<IdempotencyKey>, IdempotencyError> {
        let model = sqlx::query_as::<_, IdempotencyKeyModel>(
            r#"
            SELECT * FROM idempotency_keys
            WHERE tenant_id = $1 AND key = $2 AND endpoint = $3
            "#,
        )
        .bind(tenant_id)
        .bind(key)
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdempotencyError::Repository(e.to_string()))?;

        Ok(model.map(Into::into))
    }

    async fn create(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        key: String,
        endpoint: String,
        request_hash: String,
        response_body: Value,
        status_code: i32,
    ) -> Result<IdempotencyKeyId, IdempotencyError> {
        let id = IdempotencyKeyId::new();
        let row: (IdempotencyKeyId,) = sqlx::query_as(
            r#"
            INSERT INTO idempotency_keys (
                id, tenant_id, user_id, key, endpoint, request_hash,
                response_body, status_code, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(user_id)
        .bind(key)
        .bind(endpoint)
        .bind(request_hash)
        .bind(response_body)
        .bind(status_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("idempotency_keys_tenant_id_key_endpoint") {
                IdempotencyError::Conflict("key already recorded concurrently".into())
            } else {
                IdempotencyError::Repository(e.to_string())
            }
        })?;

        Ok(row.0)
    }
}
