use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::domain::entities::WebhookEvent;
use crate::domain::types::{ProviderId, TenantId, WebhookEventId, WebhookStatus};

#[derive(Debug, FromRow)]
pub struct WebhookEventModel {
    pub id: WebhookEventId,
    pub provider_id: Option<ProviderId>,
    pub provider_event_id: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub event_type: String,
    pub payload: Value,
    pub status: WebhookStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub is_outgoing: bool,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WebhookEvent> for WebhookEventModel {
    fn from(e: WebhookEvent) -> Self {
        Self {
            id: e.id,
            provider_id: e.provider_id,
            provider_event_id: e.provider_event_id,
            tenant_id: e.tenant_id,
            event_type: e.event_type,
            payload: e.payload,
            status: e.status,
            attempts: e.attempts,
            last_error: e.last_error,
            is_outgoing: e.is_outgoing,
            next_attempt_at: e.next_attempt_at,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<WebhookEventModel> for WebhookEvent {
    fn from(m: WebhookEventModel) -> Self {
        Self {
            id: m.id,
            provider_id: m.provider_id,
            provider_event_id: m.provider_event_id,
            tenant_id: m.tenant_id,
            event_type: m.event_type,
            payload: m.payload,
            status: m.status,
            attempts: m.attempts,
            last_error: m.last_error,
            is_outgoing: m.is_outgoing,
            next_attempt_at: m.next_attempt_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
