use std::collections::HashMap;
use std::sync::Arc;

use common::events::{gateway_events_topic, InMemoryEventBus};
use common::gateway::{FlutterwaveConfig, GatewayAdapter};
use serde_json::{json, Value};
use transaction_service::domain::repository::{
    MockProviderLookupRepository, MockWebhookEventRepository,
};
use transaction_service::domain::types::ProviderId;
use transaction_service::infrastructure::gateway_registry::GatewayRegistry;
use transaction_service::use_cases::handle_webhook::HandleWebhookUseCase;

fn registry() -> Arc<GatewayRegistry> {
    let adapter = GatewayAdapter::flutterwave(
        FlutterwaveConfig {
            base_url: "https://example.test".into(),
            secret_key: "sk".into(),
            webhook_secret: "shared-secret".into(),
        },
        reqwest::Client::new(),
    );
    let mut adapters = HashMap::new();
    adapters.insert("flutterwave".to_string(), adapter);
    Arc::new(GatewayRegistry::new(adapters))
}

/// Exercises the C7 -> C8 boundary end to end: a verified webhook callback
/// clears dedup and lands on the `gateway.<code>.events` topic a
/// reconciliation consumer (C9) would be subscribed to.
#[tokio::test]
async fn ingested_webhook_is_published_for_reconciliation() {
    let gateways = registry();
    let bus = Arc::new(InMemoryEventBus::new(16));

    let mut webhook_repo = MockWebhookEventRepository::new();
    webhook_repo
        .expect_insert_inbound_if_absent()
        .times(1)
        .returning(|event| Ok(Some(event)));

    let mut provider_lookup = MockProviderLookupRepository::new();
    let provider_id = ProviderId::new();
    provider_lookup
        .expect_find_id_by_code()
        .returning(move |_| Ok(Some(provider_id)));

    let handle_webhook = HandleWebhookUseCase::new(
        Arc::new(webhook_repo),
        Arc::new(provider_lookup),
        gateways,
        bus.clone(),
    );

    let mut subscription = bus.subscribe(&gateway_events_topic("flutterwave"), "test-consumer");

    let body = br#"{"event":"charge.completed","data":{"id":"evt-1","reference":"ref-xyz"}}"#;
    handle_webhook
        .execute("flutterwave", "shared-secret", body)
        .await
        .expect("webhook ingestion should succeed");

    let relayed: Value = subscription.recv().await.expect("event should be published");
    assert_eq!(relayed["data"]["reference"], "ref-xyz");
}

#[tokio::test]
async fn unsigned_webhook_is_rejected_before_touching_the_repository() {
    let gateways = registry();
    let bus = Arc::new(InMemoryEventBus::new(16));

    // No expectations set: a rejected signature must short-circuit before
    // either repository is touched.
    let webhook_repo = MockWebhookEventRepository::new();
    let provider_lookup = MockProviderLookupRepository::new();

    let handle_webhook = HandleWebhookUseCase::new(
        Arc::new(webhook_repo),
        Arc::new(provider_lookup),
        gateways,
        bus,
    );

    let body = json!({ "event": "charge.completed", "data": { "id": "evt-2" } })
        .to_string()
        .into_bytes();

    let result = handle_webhook
        .execute("flutterwave", "wrong-secret", &body)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn duplicate_inbound_webhook_does_not_reach_the_bus() {
    let gateways = registry();
    let bus = Arc::new(InMemoryEventBus::new(16));

    let mut webhook_repo = MockWebhookEventRepository::new();
    webhook_repo
        .expect_insert_inbound_if_absent()
        .times(1)
        .returning(|_| Ok(None));

    let mut provider_lookup = MockProviderLookupRepository::new();
    provider_lookup
        .expect_find_id_by_code()
        .returning(|_| Ok(Some(ProviderId::new())));

    let handle_webhook = HandleWebhookUseCase::new(
        Arc::new(webhook_repo),
        Arc::new(provider_lookup),
        gateways,
        bus.clone(),
    );

    let body = json!({ "event": "charge.completed", "data": { "id": "evt-dup" } })
        .to_string()
        .into_bytes();

    handle_webhook
        .execute("flutterwave", "shared-secret", &body)
        .await
        .expect("duplicate should be absorbed, not errored");
}
