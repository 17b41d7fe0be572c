use std::sync::Arc;

use common::events::{InMemoryEventBus, WALLET_DEPOSIT_SUCCESS_TOPIC};
use rust_decimal::Decimal;

use crate::domain::error::WalletError;
use crate::domain::repository::{LedgerRepository, SettlementOutcome, TenantNotifier};

/// §4.6.4 steps 2-4, invoked over gRPC once `transaction_service`'s
/// reconciliation consumer has already verified the gateway transaction.
/// Safe to call repeatedly for the same reference (S3/S6).
#[derive(Clone)]
pub struct SettleDepositUseCase {
    ledger_repo: Arc<dyn LedgerRepository>,
    event_bus: Arc<InMemoryEventBus>,
    tenant_notifier: Arc<dyn TenantNotifier>,
}

impl SettleDepositUseCase {
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

    #[tracing::instrument(name = "SettleDepositUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        reference: &str,
        amount_from_gateway: Decimal,
    ) -> Result<SettlementOutcome, WalletError> {
        let (transaction, outcome) = self
            .ledger_repo
            .settle_deposit(reference, amount_from_gateway)
            .await?;

        if outcome == SettlementOutcome::Settled {
            if let Err(e) = self
                .event_bus
                .publish(WALLET_DEPOSIT_SUCCESS_TOPIC, &transaction)
                .await
            {
                tracing::warn!(error = %e, reference, "failed to publish wallet.deposit.success");
            }

            let payload = serde_json::to_value(&transaction).unwrap_or(serde_json::Value::Null);
            if let Err(e) = self
                .tenant_notifier
                .notify(transaction.tenant_id, WALLET_DEPOSIT_SUCCESS_TOPIC, payload)
                .await
            {
                tracing::warn!(error = %e, reference, "failed to notify transaction_service of settlement");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Transaction;
    use crate::domain::repository::{MockLedgerRepository, MockTenantNotifier};
    use crate::domain::types::{ProviderId, TenantId, TransactionStatus, TransactionType, WalletId};
    use rust_decimal_macros::dec;

    fn notifier_expecting_one_call() -> MockTenantNotifier {
        let mut notifier = MockTenantNotifier::new();
        notifier.expect_notify().times(1).returning(|_, _, _| Ok(()));
        notifier
    }

    fn sample_transaction() -> Transaction {
        Transaction {
            id: crate::domain::types::TransactionId::new(),
            tenant_id: TenantId::new(),
            wallet_id: WalletId::new(),
            provider_id: Some(ProviderId::new()),
            currency_code: "NGN".into(),
            reference: "ref-1".into(),
            transaction_type: TransactionType::Deposit,
            status: TransactionStatus::Completed,
            amount: dec!(1000),
            fee: dec!(0),
            metadata: serde_json::Value::Null,
            error_reason: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn settling_publishes_success_event() {
        let mut ledger_repo = MockLedgerRepository::new();
        ledger_repo
            .expect_settle_deposit()
            .times(1)
            .returning(|_, _| Ok((sample_transaction(), SettlementOutcome::Settled)));

        let bus = Arc::new(InMemoryEventBus::new(16));
        let mut sub = bus.subscribe(WALLET_DEPOSIT_SUCCESS_TOPIC, "test");

        let use_case = SettleDepositUseCase::new(
            Arc::new(ledger_repo),
            bus,
            Arc::new(notifier_expecting_one_call()),
        );
        let outcome = use_case.execute("ref-1", dec!(1000)).await.unwrap();

        assert_eq!(outcome, SettlementOutcome::Settled);
        let received: Transaction = sub.recv().await.unwrap();
        assert_eq!(received.reference, "ref-1");
    }

    #[tokio::test]
    async fn already_settled_does_not_republish() {
        let mut ledger_repo = MockLedgerRepository::new();
        ledger_repo
            .expect_settle_deposit()
            .times(1)
            .returning(|_, _| Ok((sample_transaction(), SettlementOutcome::AlreadySettled)));

        let bus = Arc::new(InMemoryEventBus::new(16));
        let use_case = SettleDepositUseCase::new(Arc::new(ledger_repo), bus, Arc::new(MockTenantNotifier::new()));
        let outcome = use_case.execute("ref-1", dec!(1000)).await.unwrap();

        assert_eq!(outcome, SettlementOutcome::AlreadySettled);
    }
}
