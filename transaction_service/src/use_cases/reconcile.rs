use std::sync::Arc;

use common::gateway::{PaymentGateway, VerifiedStatus};
use common::money::from_minor_units;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::error::WebhookError;
use crate::domain::gateways::{SettlementGateway, SettlementOutcome};
use crate::infrastructure::gateway_registry::GatewayRegistry;

/// C9: one call per gateway event lifted off the `gateway.<code>.events`
/// topic. Re-verifies against the provider directly rather than trusting
/// the callback body, then relays the verified outcome to wallet_service.
pub struct ReconcileUseCase {
    gateways: Arc<GatewayRegistry>,
    settlement_gateway: Arc<dyn SettlementGateway>,
}

impl ReconcileUseCase {
    pub fn new(
        gateways: Arc<GatewayRegistry>,
        settlement_gateway: Arc<dyn SettlementGateway>,
    ) -> Self {
        Self {
            gateways,
            settlement_gateway,
        }
    }

    #[tracing::instrument(name = "ReconcileUseCase::execute", skip(self, raw_event))]
    pub async fn execute(
        &self,
        provider_code: &str,
        raw_event: &Value,
    ) -> Result<SettlementOutcome, WebhookError> {
        let adapter = self
            .gateways
            .get(provider_code)
            .ok_or_else(|| WebhookError::UnknownProvider(provider_code.to_string()))?;

        let reference = raw_event
            .get("data")
            .and_then(|data| data.get("reference").or_else(|| data.get("id")))
            .and_then(Value::as_str)
            .ok_or_else(|| WebhookError::UnknownReference("missing gateway reference".into()))?;

        let verified = adapter
            .verify_transaction(reference)
            .await
            .map_err(|e| WebhookError::Settlement(e.to_string()))?;

        match verified.status {
            VerifiedStatus::Success => {
                let amount = from_minor_units(verified.amount_minor, &verified.currency);
                let outcome = self
                    .settlement_gateway
                    .settle_deposit(reference, amount)
                    .await?;
                info!(reference, ?outcome, "deposit settled");
                Ok(outcome)
            }
            VerifiedStatus::Failed => {
                self.settlement_gateway
                    .mark_deposit_failed(reference, "provider verification returned failed")
                    .await?;
                warn!(reference, "deposit verification failed at provider");
                Ok(SettlementOutcome::AlreadySettled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::MockSettlementGateway;
    use common::gateway::{FlutterwaveConfig, GatewayAdapter};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn registry() -> Arc<GatewayRegistry> {
        let adapter = GatewayAdapter::flutterwave(
            FlutterwaveConfig {
                base_url: "https://example.test".into(),
                secret_key: "sk".into(),
                webhook_secret: "secret".into(),
            },
            reqwest::Client::new(),
        );
        let mut adapters = HashMap::new();
        adapters.insert("flutterwave".to_string(), adapter);
        Arc::new(GatewayRegistry::new(adapters))
    }

    #[tokio::test]
    async fn missing_reference_is_rejected() {
        let settlement_gateway = MockSettlementGateway::new();
        let use_case = ReconcileUseCase::new(registry(), Arc::new(settlement_gateway));

        let event = serde_json::json!({ "event": "charge.completed", "data": {} });
        let result = use_case.execute("flutterwave", &event).await;

        assert!(matches!(result, Err(WebhookError::UnknownReference(_))));
    }

    #[tokio::test]
    async fn unknown_provider_code_is_rejected() {
        let settlement_gateway = MockSettlementGateway::new();
        let use_case = ReconcileUseCase::new(registry(), Arc::new(settlement_gateway));

        let event = serde_json::json!({ "data": { "reference": "ref-1" } });
        let result = use_case.execute("unknown-gateway", &event).await;

        assert!(matches!(result, Err(WebhookError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn amount_conversion_uses_minor_units_helper() {
        assert_eq!(from_minor_units(150_000, "NGN"), dec!(1500.00));
    }
}
