use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::error::WebhookError;
use crate::domain::gateways::{SettlementGateway, SettlementOutcome};

/// Always settles successfully; lets this crate's flow be exercised without
/// a running wallet_service.
pub struct FakeSettlementGateway;

impl FakeSettlementGateway {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeSettlementGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementGateway for FakeSettlementGateway {
    async fn settle_deposit(
        &self,
        reference: &str,
        amount: Decimal,
    ) -> Result<SettlementOutcome, WebhookError> {
        info!(reference, %amount, "fake settlement gateway settling deposit");
        Ok(SettlementOutcome::Settled)
    }

    async fn mark_deposit_failed(
        &self,
        reference: &str,
        reason: &str,
    ) -> Result<(), WebhookError> {
        info!(reference, reason, "fake settlement gateway marking deposit failed");
        Ok(())
    }
}
