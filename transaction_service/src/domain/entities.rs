use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::types::{ProviderId, TenantId, WebhookEventId, WebhookStatus};

/// A single gateway callback (inbound) or tenant delivery attempt (outbound).
/// Inbound rows dedup on `(provider_id, provider_event_id)`; outbound rows
/// track their own retry state (`attempts`, `next_attempt_at`).
#[derive(Debug, Clone)]
pub struct WebhookEvent {
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

impl WebhookEvent {
    /// A newly-ingested inbound gateway callback (C7 step 3).
    pub fn inbound(
        provider_id: ProviderId,
        provider_event_id: String,
        event_type: String,
        payload: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WebhookEventId::new(),
            provider_id: Some(provider_id),
            provider_event_id: Some(provider_event_id),
            tenant_id: None,
            event_type,
            payload,
            status: WebhookStatus::Pending,
            attempts: 0,
            last_error: None,
            is_outgoing: false,
            next_attempt_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An outbound delivery queued for a tenant (C10 step 2).
    pub fn outbound(tenant_id: TenantId, event_type: String, payload: Value) -> Self {
        let now = Utc::now();
        Self {
            id: WebhookEventId::new(),
            provider_id: None,
            provider_event_id: None,
            tenant_id: Some(tenant_id),
            event_type,
            payload,
            status: WebhookStatus::Pending,
            attempts: 0,
            last_error: None,
            is_outgoing: true,
            next_attempt_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Retry backoff schedule for outbound deliveries (spec §4.10), capped at 6
/// attempts: 1s, 5s, 30s, 2m, 10m, 1h.
pub const OUTBOUND_BACKOFF_SECONDS: [i64; 6] = [1, 5, 30, 120, 600, 3600];
pub const OUTBOUND_MAX_ATTEMPTS: i32 = OUTBOUND_BACKOFF_SECONDS.len() as i32;
