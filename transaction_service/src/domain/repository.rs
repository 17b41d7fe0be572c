use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::WebhookEvent;
use crate::domain::error::WebhookError;
use crate::domain::types::{ProviderId, WebhookEventId};

/// Port for `WebhookEvent` persistence (C7 inbound rows, C10 outbound rows).
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait WebhookEventRepository: Send + Sync {
    /// Inserts an inbound row keyed by `(provider_id, provider_event_id)`.
    /// Returns `None` if a row with that key already exists — the caller's
    /// cue to stop, per spec §4.7 step 3's first-layer dedup.
    async fn insert_inbound_if_absent(
        &self,
        event: WebhookEvent,
    ) -> Result<Option<WebhookEvent>, WebhookError>;

    async fn create_outbound(&self, event: WebhookEvent) -> Result<WebhookEvent, WebhookError>;

    async fn find_by_id(&self, id: WebhookEventId) -> Result<Option<WebhookEvent>, WebhookError>;

    async fn mark_delivered(&self, id: WebhookEventId) -> Result<(), WebhookError>;

    /// Records a failed delivery attempt and schedules the next retry.
    /// `next_attempt_at = None` means the backoff schedule is exhausted.
    async fn mark_retry(
        &self,
        id: WebhookEventId,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<(), WebhookError>;

    /// Outbound rows in `failed` status whose `next_attempt_at` has elapsed
    /// and whose `attempts` are still under the backoff schedule's cap.
    async fn find_due_retries(&self, now: DateTime<Utc>) -> Result<Vec<WebhookEvent>, WebhookError>;
}

/// Minimal read-only slice of `providers` this crate needs: the row's id,
/// to key inbound `WebhookEvent`s. Verification itself uses this crate's own
/// gateway adapter config (C4), not the ledger-owned provider row.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProviderLookupRepository: Send + Sync {
    async fn find_id_by_code(&self, code: &str) -> Result<Option<ProviderId>, WebhookError>;
}

/// Minimal read-only slice of `tenants` C10 needs. `None` covers both
/// "tenant not found" and "tenant has no webhook URL configured" — both
/// cases are handled identically (log and ack, spec §4.10 step 1).
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait TenantLookupRepository: Send + Sync {
    async fn find_webhook_url(
        &self,
        tenant_id: crate::domain::types::TenantId,
    ) -> Result<Option<String>, WebhookError>;
}
