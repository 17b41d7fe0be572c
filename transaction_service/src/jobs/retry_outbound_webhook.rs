use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::domain::repository::WebhookEventRepository;
use crate::use_cases::emit_tenant_webhook::EmitTenantWebhookUseCase;

/// C10's retry sweep: picks up outbound rows `find_due_retries` surfaces and
/// re-attempts delivery on the same scan-and-retry shape as the provider
/// metrics job's interval loop.
pub struct RetryOutboundWebhookJob {
    webhook_repo: Arc<dyn WebhookEventRepository>,
    emit_use_case: Arc<EmitTenantWebhookUseCase>,
}

impl RetryOutboundWebhookJob {
    pub fn new(
        webhook_repo: Arc<dyn WebhookEventRepository>,
        emit_use_case: Arc<EmitTenantWebhookUseCase>,
    ) -> Self {
        Self {
            webhook_repo,
            emit_use_case,
        }
    }

    pub async fn tick(&self) {
        let due = match self.webhook_repo.find_due_retries(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to fetch due outbound webhook retries");
                return;
            }
        };

        if due.is_empty() {
            return;
        }
        info!(count = due.len(), "retrying outbound tenant webhooks");

        for event in due {
            let event_id = event.id;
            if let Err(e) = self.emit_use_case.retry(event).await {
                error!(event_id = %event_id, error = %e, "outbound webhook retry failed");
            }
        }
    }
}

pub fn spawn_retry_loop(job: Arc<RetryOutboundWebhookJob>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            job.tick().await;
        }
    });
}
