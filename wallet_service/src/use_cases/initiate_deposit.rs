use std::sync::Arc;

use common::gateway::{InitDepositRequest, PaymentGateway};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::error::{DepositError, ProviderError, WalletError};
use crate::domain::repository::{LedgerRepository, ProviderRepository, WalletRepository};
use crate::domain::types::{ProviderId, TenantId, UserId};
use crate::infrastructure::gateways::build_adapter;

/// §4.6.1: deposit initiation. Provider metrics are updated on the gateway
/// call itself (availability), not on eventual settlement — settlement
/// success/failure is recorded separately when C9 resolves it.
#[derive(Clone)]
pub struct InitiateDepositUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    provider_repo: Arc<dyn ProviderRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
    http_client: reqwest::Client,
}

pub struct InitiateDepositResult {
    pub authorization_url: String,
    pub reference: String,
    pub provider_code: String,
    pub provider_id: ProviderId,
}

impl InitiateDepositUseCase {
    pub fn new(
        wallet_repo: Arc<dyn WalletRepository>,
        provider_repo: Arc<dyn ProviderRepository>,
        ledger_repo: Arc<dyn LedgerRepository>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            wallet_repo,
            provider_repo,
            ledger_repo,
            http_client,
        }
    }

    #[tracing::instrument(name = "InitiateDepositUseCase::execute", skip(self, metadata))]
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        user_email: &str,
        currency: &str,
        amount: Decimal,
        channel: &str,
        metadata: Value,
    ) -> Result<InitiateDepositResult, DepositError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount("amount must be positive".into()).into());
        }

        let wallet = self
            .wallet_repo
            .find_by_user_and_currency(user_id, currency)
            .await?
            .ok_or_else(|| WalletError::NoWalletForCurrency(currency.to_string()))?;

        let provider = self
            .provider_repo
            .select_best(currency, channel)
            .await?
            .ok_or_else(|| ProviderError::NoEligibleProvider {
                currency: currency.to_string(),
                channel: channel.to_string(),
            })?;

        let adapter = build_adapter(&provider, self.http_client.clone())
            .map_err(|e| DepositError::Gateway(e.to_string()))?;

        let reference = uuid::Uuid::new_v4().to_string();
        let init_result = adapter
            .init_deposit(&InitDepositRequest {
                email: user_email.to_string(),
                amount,
                currency: currency.to_string(),
                reference: reference.clone(),
                metadata: metadata.clone(),
            })
            .await;

        let response = match init_result {
            Ok(r) => {
                let _ = self.provider_repo.record_success(provider.id).await;
                r
            }
            Err(e) => {
                let _ = self.provider_repo.record_failure(provider.id).await;
                return Err(DepositError::Gateway(e.to_string()));
            }
        };

        let (_transaction, _deposit) = self
            .ledger_repo
            .initiate_deposit(
                tenant_id,
                wallet.id,
                provider.id,
                response.reference.clone(),
                amount,
                currency.to_string(),
                metadata,
            )
            .await?;

        Ok(InitiateDepositResult {
            authorization_url: response.authorization_url,
            reference: response.reference,
            provider_code: provider.code,
            provider_id: provider.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::{MockLedgerRepository, MockProviderRepository, MockWalletRepository};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let use_case = InitiateDepositUseCase::new(
            Arc::new(MockWalletRepository::new()),
            Arc::new(MockProviderRepository::new()),
            Arc::new(MockLedgerRepository::new()),
            reqwest::Client::new(),
        );

        let result = use_case
            .execute(
                TenantId::new(),
                UserId::new(),
                "a@b.com",
                "NGN",
                dec!(0),
                "card",
                Value::Null,
            )
            .await;

        assert!(matches!(result, Err(DepositError::Wallet(WalletError::InvalidAmount(_)))));
    }

    #[tokio::test]
    async fn rejects_missing_wallet() {
        let mut wallet_repo = MockWalletRepository::new();
        wallet_repo
            .expect_find_by_user_and_currency()
            .times(1)
            .returning(|_, _| Ok(None));

        let use_case = InitiateDepositUseCase::new(
            Arc::new(wallet_repo),
            Arc::new(MockProviderRepository::new()),
            Arc::new(MockLedgerRepository::new()),
            reqwest::Client::new(),
        );

        let result = use_case
            .execute(
                TenantId::new(),
                UserId::new(),
                "a@b.com",
                "NGN",
                dec!(10),
                "card",
                Value::Null,
            )
            .await;

        assert!(matches!(
            result,
            Err(DepositError::Wallet(WalletError::NoWalletForCurrency(_)))
        ));
    }
}
