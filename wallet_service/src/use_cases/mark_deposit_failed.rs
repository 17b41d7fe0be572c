use std::sync::Arc;

use common::events::{InMemoryEventBus, WALLET_DEPOSIT_FAILED_TOPIC};

use crate::domain::entities::Transaction;
use crate::domain::error::WalletError;
use crate::domain::repository::{LedgerRepository, TenantNotifier};

/// §4.6.4 failure branch: the gateway reported (or reconciliation inferred)
/// that a pending deposit did not go through. Moves the transaction to
/// `Failed` and publishes `wallet.deposit.failed` so any outbound tenant
/// webhook (C10) can fire.
#[derive(Clone)]
pub struct MarkDepositFailedUseCase {
    ledger_repo: Arc<dyn LedgerRepository>,
    event_bus: Arc<InMemoryEventBus>,
    tenant_notifier: Arc<dyn TenantNotifier>,
}

impl MarkDepositFailedUseCase {
    pub fn new(
        ledger_repo: Arc<dyn LedgerRepository>,
        event_bus: Arc<InMemoryEventBus>,
        tenant_notifier: Arc<dyn TenantNotifier>,
    ) -> Self {
        Self {
            ledger_repo,
            event_bus,
            tenant_notifier,
        }
    }

    #[tracing::instrument(name = "MarkDepositFailedUseCase::execute", skip(self))]
    pub async fn execute(&self, reference: &str, reason: &str) -> Result<Transaction, WalletError> {
        let transaction = self
            .ledger_repo
            .mark_deposit_failed(reference, reason.to_string())
            .await?;

        if let Err(e) = self
            .event_bus
            .publish(WALLET_DEPOSIT_FAILED_TOPIC, &transaction)
            .await
        {
            tracing::warn!(error = %e, reference, "failed to publish wallet.deposit.failed");
        }

        let payload = serde_json::to_value(&transaction).unwrap_or(serde_json::Value::Null);
        if let Err(e) = self
            .tenant_notifier
            .notify(transaction.tenant_id, WALLET_DEPOSIT_FAILED_TOPIC, payload)
            .await
        {
            tracing::warn!(error = %e, reference, "failed to notify transaction_service of failure");
        }

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::{MockLedgerRepository, MockTenantNotifier};
    use crate::domain::types::{ProviderId, TenantId, TransactionId, TransactionStatus, TransactionType, WalletId};
    use common::events::WALLET_DEPOSIT_FAILED_TOPIC;
    use rust_decimal_macros::dec;

    fn sample_transaction() -> Transaction {
        Transaction {
            id: TransactionId::new(),
            tenant_id: TenantId::new(),
            wallet_id: WalletId::new(),
            provider_id: Some(ProviderId::new()),
            currency_code: "NGN".into(),
            reference: "ref-1".into(),
            transaction_type: TransactionType::Deposit,
            status: TransactionStatus::Failed,
            amount: dec!(1000),
            fee: dec!(0),
            metadata: serde_json::Value::Null,
            error_reason: Some("insufficient funds".into()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn marking_failed_publishes_failure_event() {
        let mut ledger_repo = MockLedgerRepository::new();
        ledger_repo
            .expect_mark_deposit_failed()
            .times(1)
            .returning(|_, _| Ok(sample_transaction()));

        let bus = Arc::new(InMemoryEventBus::new(16));
        let mut sub = bus.subscribe(WALLET_DEPOSIT_FAILED_TOPIC, "test");

        let mut tenant_notifier = MockTenantNotifier::new();
        tenant_notifier.expect_notify().times(1).returning(|_, _, _| Ok(()));

        let use_case = MarkDepositFailedUseCase::new(Arc::new(ledger_repo), bus, Arc::new(tenant_notifier));
        let transaction = use_case.execute("ref-1", "insufficient funds").await.unwrap();

        assert_eq!(transaction.status, TransactionStatus::Failed);
        let received: Transaction = sub.recv().await.unwrap();
        assert_eq!(received.reference, "ref-1");
    }
}
