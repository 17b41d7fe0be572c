use std::sync::Arc;

use common::events::{gateway_events_topic, EventBusError, InMemoryEventBus};
use common::error::{DomainError, ErrorKind};
use serde_json::Value;
use tracing::{error, warn};

use crate::use_cases::reconcile::ReconcileUseCase;

/// C9: one long-lived consumer per configured gateway, each on its own
/// `gateway.<code>.events` topic. Grounded in `ProviderMetricsJob`'s
/// spawn-a-background-loop shape, subscribing instead of ticking.
pub struct ReconciliationConsumer {
    provider_code: String,
    event_bus: Arc<InMemoryEventBus>,
    reconcile: Arc<ReconcileUseCase>,
}

impl ReconciliationConsumer {
    pub fn new(
        provider_code: String,
        event_bus: Arc<InMemoryEventBus>,
        reconcile: Arc<ReconcileUseCase>,
    ) -> Self {
        Self {
            provider_code,
            event_bus,
            reconcile,
        }
    }

    async fn run(&self) {
        let topic = gateway_events_topic(&self.provider_code);
        let mut subscription = self.event_bus.subscribe(&topic, "reconciliation-consumer");

        loop {
            let event: Value = match subscription.recv().await {
                Ok(event) => event,
                Err(EventBusError::Decode(e)) => {
                    warn!(provider_code = %self.provider_code, error = %e, "unreadable gateway event, dropping");
                    continue;
                }
                Err(e) => {
                    error!(provider_code = %self.provider_code, error = %e, "reconciliation subscription broke");
                    return;
                }
            };

            match self.reconcile.execute(&self.provider_code, &event).await {
                Ok(outcome) => {
                    tracing::debug!(provider_code = %self.provider_code, ?outcome, "reconciled gateway event");
                }
                Err(e) if matches!(e.kind(), ErrorKind::ProviderUnavailable) => {
                    // The in-process bus has no redelivery: this event is
                    // dropped, not retried, even though the failure class is
                    // one that would otherwise be worth retrying.
                    warn!(provider_code = %self.provider_code, error = %e, "provider unavailable during reconciliation, event dropped");
                }
                Err(e) => {
                    error!(provider_code = %self.provider_code, error = %e, "permanent reconciliation failure, event dropped");
                }
            }
        }
    }
}

pub fn spawn(consumer: ReconciliationConsumer) {
    tokio::spawn(async move {
        consumer.run().await;
    });
}
