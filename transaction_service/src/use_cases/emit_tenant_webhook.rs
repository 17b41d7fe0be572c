use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::entities::{WebhookEvent, OUTBOUND_BACKOFF_SECONDS, OUTBOUND_MAX_ATTEMPTS};
use crate::domain::error::WebhookError;
use crate::domain::repository::{TenantLookupRepository, WebhookEventRepository};
use crate::domain::types::TenantId;

/// C10: relays a settled/failed deposit to the tenant's own webhook URL.
/// Delivery runs inline on the triggering event; the retry job
/// (`jobs::retry_outbound_webhook`) sweeps rows this leaves in `failed`.
pub struct EmitTenantWebhookUseCase {
    tenant_lookup: Arc<dyn TenantLookupRepository>,
    webhook_repo: Arc<dyn WebhookEventRepository>,
    http_client: reqwest::Client,
}

impl EmitTenantWebhookUseCase {
    pub fn new(
        tenant_lookup: Arc<dyn TenantLookupRepository>,
        webhook_repo: Arc<dyn WebhookEventRepository>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            tenant_lookup,
            webhook_repo,
            http_client,
        }
    }

    #[tracing::instrument(name = "EmitTenantWebhookUseCase::execute", skip(self, payload))]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        event_type: &str,
        payload: Value,
    ) -> Result<(), WebhookError> {
        let Some(url) = self.tenant_lookup.find_webhook_url(tenant_id).await? else {
            info!(%tenant_id, "no webhook url configured for tenant, skipping delivery");
            return Ok(());
        };

        let event = self
            .webhook_repo
            .create_outbound(WebhookEvent::outbound(
                tenant_id,
                event_type.to_string(),
                payload,
            ))
            .await?;

        self.deliver(&event, &url).await
    }

    /// Re-attempts a row the retry job picked up from `find_due_retries`.
    pub async fn retry(&self, event: WebhookEvent) -> Result<(), WebhookError> {
        let Some(tenant_id) = event.tenant_id else {
            return Err(WebhookError::Repository(
                "outbound webhook event missing tenant_id".into(),
            ));
        };
        let Some(url) = self.tenant_lookup.find_webhook_url(tenant_id).await? else {
            info!(%tenant_id, "tenant no longer has a webhook url, abandoning retry");
            return Ok(());
        };

        self.deliver(&event, &url).await
    }

    async fn deliver(&self, event: &WebhookEvent, url: &str) -> Result<(), WebhookError> {
        let send_result = self
            .http_client
            .post(url)
            .json(&event.payload)
            .send()
            .await;

        match send_result {
            Ok(resp) if resp.status().is_success() => {
                self.webhook_repo.mark_delivered(event.id).await?;
                info!(event_id = %event.id, "tenant webhook delivered");
                Ok(())
            }
            Ok(resp) => {
                let reason = format!("tenant endpoint returned {}", resp.status());
                self.schedule_retry(event, &reason).await
            }
            Err(e) => self.schedule_retry(event, &e.to_string()).await,
        }
    }

    async fn schedule_retry(&self, event: &WebhookEvent, reason: &str) -> Result<(), WebhookError> {
        let next_attempt_at = next_attempt_time(event.attempts);
        if next_attempt_at.is_none() {
            warn!(event_id = %event.id, reason, "tenant webhook exhausted retry schedule");
        }
        self.webhook_repo
            .mark_retry(event.id, reason, next_attempt_at)
            .await
    }
}

/// `attempts` is the count *before* this failed attempt is recorded, so the
/// backoff slot to use is `OUTBOUND_BACKOFF_SECONDS[attempts]`.
fn next_attempt_time(attempts: i32) -> Option<DateTime<Utc>> {
    if attempts >= OUTBOUND_MAX_ATTEMPTS {
        return None;
    }
    let delay = OUTBOUND_BACKOFF_SECONDS[attempts as usize];
    Some(Utc::now() + Duration::seconds(delay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::{MockTenantLookupRepository, MockWebhookEventRepository};

    #[tokio::test]
    async fn tenant_without_webhook_url_skips_delivery() {
        let mut tenant_lookup = MockTenantLookupRepository::new();
        tenant_lookup
            .expect_find_webhook_url()
            .returning(|_| Ok(None));
        let webhook_repo = MockWebhookEventRepository::new();

        let use_case = EmitTenantWebhookUseCase::new(
            Arc::new(tenant_lookup),
            Arc::new(webhook_repo),
            reqwest::Client::new(),
        );

        let result = use_case
            .execute(TenantId::new(), "wallet.deposit.success", Value::Null)
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn retry_schedule_is_exhausted_after_max_attempts() {
        assert!(next_attempt_time(OUTBOUND_MAX_ATTEMPTS).is_none());
        assert!(next_attempt_time(OUTBOUND_MAX_ATTEMPTS - 1).is_some());
    }
}
