use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entities::{WebhookEvent, OUTBOUND_MAX_ATTEMPTS};
use crate::domain::error::WebhookError;
use crate::domain::repository::WebhookEventRepository;
use crate::domain::types::WebhookEventId;
use crate::infrastructure::persistence::models::WebhookEventModel;

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn insert_inbound_if_absent(
        &self,
        event: WebhookEvent,
    ) -> Result<Option<WebhookEvent>, WebhookError> {
        let model = WebhookEventModel::from(event);
        let inserted = sqlx::query_as::<_, WebhookEventModel>(
            r#"
            INSERT INTO webhook_events (
                id, provider_id, provider_event_id, tenant_id, event_type,
                payload, status, attempts, last_error, is_outgoing,
                next_attempt_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT ON CONSTRAINT webhook_events_provider_event_dedup DO NOTHING
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(model.provider_id)
        .bind(model.provider_event_id)
        .bind(model.tenant_id)
        .bind(model.event_type)
        .bind(model.payload)
        .bind(model.status)
        .bind(model.attempts)
        .bind(model.last_error)
        .bind(model.is_outgoing)
        .bind(model.next_attempt_at)
        .bind(model.created_at)
        .bind(model.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;

        Ok(inserted.map(WebhookEvent::from))
    }

    async fn create_outbound(&self, event: WebhookEvent) -> Result<WebhookEvent, WebhookError> {
        let model = WebhookEventModel::from(event);
        let saved = sqlx::query_as::<_, WebhookEventModel>(
            r#"
            INSERT INTO webhook_events (
                id, provider_id, provider_event_id, tenant_id, event_type,
                payload, status, attempts, last_error, is_outgoing,
                next_attempt_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(model.provider_id)
        .bind(model.provider_event_id)
        .bind(model.tenant_id)
        .bind(model.event_type)
        .bind(model.payload)
        .bind(model.status)
        .bind(model.attempts)
        .bind(model.last_error)
        .bind(model.is_outgoing)
        .bind(model.next_attempt_at)
        .bind(model.created_at)
        .bind(model.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;

        Ok(saved.into())
    }

    async fn find_by_id(&self, id: WebhookEventId) -> Result<Option<WebhookEvent>, WebhookError> {
        let model = sqlx::query_as::<_, WebhookEventModel>(
            "SELECT * FROM webhook_events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;

        Ok(model.map(WebhookEvent::from))
    }

    async fn mark_delivered(&self, id: WebhookEventId) -> Result<(), WebhookError> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET status = 'delivered', attempts = attempts + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn mark_retry(
        &self,
        id: WebhookEventId,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<(), WebhookError> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET status = 'failed',
                attempts = attempts + 1,
                last_error = $1,
                next_attempt_at = $2,
                updated_at = now()
            WHERE id = $3
            "#,
        )
        .bind(error)
        .bind(next_attempt_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn find_due_retries(&self, now: DateTime<Utc>) -> Result<Vec<WebhookEvent>, WebhookError> {
        let models = sqlx::query_as::<_, WebhookEventModel>(
            r#"
            SELECT * FROM webhook_events
            WHERE is_outgoing = true
              AND status = 'failed'
              AND attempts < $1
              AND next_attempt_at <= $2
            ORDER BY next_attempt_at ASC
            LIMIT 50
            "#,
        )
        .bind(OUTBOUND_MAX_ATTEMPTS)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebhookError::Repository(e.to_string()))?;

        Ok(models.into_iter().map(WebhookEvent::from).collect())
    }
}
