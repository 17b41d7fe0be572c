use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::error::WebhookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled,
    AlreadySettled,
}

/// C9's only way to reach C6: wallet_service's internal `SettleDeposit`/
/// `MarkDepositFailed` RPC, the edge between this crate and the
/// wallet-moving service.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SettlementGateway: Send + Sync {
    async fn settle_deposit(
        &self,
        reference: &str,
        amount: Decimal,
    ) -> Result<SettlementOutcome, WebhookError>;

    async fn mark_deposit_failed(&self, reference: &str, reason: &str)
        -> Result<(), WebhookError>;
}
