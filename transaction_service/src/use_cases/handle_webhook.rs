use std::sync::Arc;

use common::events::{gateway_events_topic, EventBus, InMemoryEventBus};
use common::gateway::PaymentGateway;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::entities::WebhookEvent;
use crate::domain::error::WebhookError;
use crate::domain::repository::{ProviderLookupRepository, WebhookEventRepository};
use crate::infrastructure::gateway_registry::GatewayRegistry;

/// C7: the only synchronous work a gateway callback gets. Everything past
/// the dedup insert is handed to the bus — C9 picks it up from there.
pub struct HandleWebhookUseCase {
    webhook_repo: Arc<dyn WebhookEventRepository>,
    provider_lookup: Arc<dyn ProviderLookupRepository>,
    gateways: Arc<GatewayRegistry>,
    event_bus: Arc<InMemoryEventBus>,
}

impl HandleWebhookUseCase {
    pub fn new(
        webhook_repo: Arc<dyn WebhookEventRepository>,
        provider_lookup: Arc<dyn ProviderLookupRepository>,
        gateways: Arc<GatewayRegistry>,
        event_bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            webhook_repo,
            provider_lookup,
            gateways,
            event_bus,
        }
    }

    #[tracing::instrument(name = "HandleWebhookUseCase::execute", skip(self, raw_body))]
    pub async fn execute(
        &self,
        provider_code: &str,
        signature_header: &str,
        raw_body: &[u8],
    ) -> Result<(), WebhookError> {
        let adapter = self
            .gateways
            .get(provider_code)
            .ok_or_else(|| WebhookError::UnknownProvider(provider_code.to_string()))?;

        if !adapter.verify_signature(raw_body, signature_header) {
            return Err(WebhookError::InvalidSignature);
        }

        let payload: Value = serde_json::from_slice(raw_body)
            .map_err(|e| WebhookError::UnparseableBody(e.to_string()))?;

        let event_type = payload
            .get("event")
            .or_else(|| payload.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let provider_event_id = payload
            .get("data")
            .and_then(|data| data.get("id").or_else(|| data.get("reference")))
            .and_then(Value::as_str)
            .or_else(|| payload.get("id").and_then(Value::as_str))
            .ok_or_else(|| WebhookError::UnparseableBody("missing event id/reference".into()))?
            .to_string();

        let provider_id = self
            .provider_lookup
            .find_id_by_code(provider_code)
            .await?
            .ok_or_else(|| WebhookError::UnknownProvider(provider_code.to_string()))?;

        let event = WebhookEvent::inbound(
            provider_id,
            provider_event_id,
            event_type,
            payload.clone(),
        );

        let inserted = self.webhook_repo.insert_inbound_if_absent(event).await?;
        if inserted.is_none() {
            info!(provider_code, "duplicate webhook event, already ingested");
            return Ok(());
        }

        if let Err(e) = self
            .event_bus
            .publish(&gateway_events_topic(provider_code), &payload)
            .await
        {
            warn!(error = %e, provider_code, "failed to publish gateway event to bus");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::{MockProviderLookupRepository, MockWebhookEventRepository};
    use crate::domain::types::ProviderId;
    use common::gateway::{FlutterwaveConfig, GatewayAdapter};
    use std::collections::HashMap;

    fn registry_with_flutterwave(shared_secret: &str) -> Arc<GatewayRegistry> {
        let adapter = GatewayAdapter::flutterwave(
            FlutterwaveConfig {
                base_url: "https://example.test".into(),
                secret_key: "sk".into(),
                webhook_secret: shared_secret.into(),
            },
            reqwest::Client::new(),
        );
        let mut adapters = HashMap::new();
        adapters.insert("flutterwave".to_string(), adapter);
        Arc::new(GatewayRegistry::new(adapters))
    }

    #[tokio::test]
    async fn rejects_bad_signature() {
        let webhook_repo = MockWebhookEventRepository::new();
        let provider_lookup = MockProviderLookupRepository::new();
        let use_case = HandleWebhookUseCase::new(
            Arc::new(webhook_repo),
            Arc::new(provider_lookup),
            registry_with_flutterwave("correct-secret"),
            Arc::new(InMemoryEventBus::new(16)),
        );

        let result = use_case
            .execute("flutterwave", "wrong-secret", br#"{"event":"charge.completed"}"#)
            .await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[tokio::test]
    async fn unknown_provider_code_is_rejected() {
        let webhook_repo = MockWebhookEventRepository::new();
        let provider_lookup = MockProviderLookupRepository::new();
        let use_case = HandleWebhookUseCase::new(
            Arc::new(webhook_repo),
            Arc::new(provider_lookup),
            registry_with_flutterwave("secret"),
            Arc::new(InMemoryEventBus::new(16)),
        );

        let result = use_case
            .execute("unknown-gateway", "secret", br#"{"event":"charge.completed"}"#)
            .await;

        assert!(matches!(result, Err(WebhookError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn duplicate_event_stops_after_dedup_check() {
        let mut webhook_repo = MockWebhookEventRepository::new();
        webhook_repo
            .expect_insert_inbound_if_absent()
            .times(1)
            .returning(|_| Ok(None));

        let mut provider_lookup = MockProviderLookupRepository::new();
        provider_lookup
            .expect_find_id_by_code()
            .returning(|_| Ok(Some(ProviderId::new())));

        let use_case = HandleWebhookUseCase::new(
            Arc::new(webhook_repo),
            Arc::new(provider_lookup),
            registry_with_flutterwave("secret"),
            Arc::new(InMemoryEventBus::new(16)),
        );

        let body = br#"{"event":"charge.completed","data":{"id":"evt-1"}}"#;
        let result = use_case.execute("flutterwave", "secret", body).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fresh_event_is_inserted_and_published() {
        let mut webhook_repo = MockWebhookEventRepository::new();
        webhook_repo
            .expect_insert_inbound_if_absent()
            .times(1)
            .returning(|event| Ok(Some(event)));

        let mut provider_lookup = MockProviderLookupRepository::new();
        provider_lookup
            .expect_find_id_by_code()
            .returning(|_| Ok(Some(ProviderId::new())));

        let bus = Arc::new(InMemoryEventBus::new(16));
        let mut sub = bus.subscribe(&gateway_events_topic("flutterwave"), "test");

        let use_case = HandleWebhookUseCase::new(
            Arc::new(webhook_repo),
            Arc::new(provider_lookup),
            registry_with_flutterwave("secret"),
            bus,
        );

        let body = br#"{"event":"charge.completed","data":{"id":"evt-2"}}"#;
        use_case.execute("flutterwave", "secret", body).await.unwrap();

        let received: Value = sub.recv().await.unwrap();
        assert_eq!(received["data"]["id"], "evt-2");
    }
}
