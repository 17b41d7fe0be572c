use async_trait::async_trait;
use rust_decimal::Decimal;
use tonic::transport::Channel;
use tracing::error;

use crate::api::proto::wallet::wallet_service_client::WalletServiceClient;
use crate::api::proto::wallet::{MarkDepositFailedRequest, SettleDepositRequest};
use crate::domain::error::WebhookError;
use crate::domain::gateways::{SettlementGateway, SettlementOutcome};

/// C9's RPC edge into wallet_service.
pub struct GrpcSettlementGateway {
    wallet_addr: String,
}

impl GrpcSettlementGateway {
    pub fn new(wallet_addr: String) -> Self {
        Self { wallet_addr }
    }

    async fn connect(&self) -> Result<WalletServiceClient<Channel>, WebhookError> {
        WalletServiceClient::connect(self.wallet_addr.clone())
            .await
            .map_err(|e| WebhookError::Settlement(format!("connect to wallet_service: {e}")))
    }
}

#[async_trait]
impl SettlementGateway for GrpcSettlementGateway {
    async fn settle_deposit(
        &self,
        reference: &str,
        amount: Decimal,
    ) -> Result<SettlementOutcome, WebhookError> {
        let mut client = self.connect().await?;
        let response = client
            .settle_deposit(SettleDepositRequest {
                reference: reference.to_string(),
                amount: amount.to_string(),
            })
            .await
            .map_err(|e| {
                error!(reference, error = %e, "settle_deposit RPC failed");
                WebhookError::Settlement(e.to_string())
            })?
            .into_inner();

        Ok(if response.already_settled {
            SettlementOutcome::AlreadySettled
        } else {
            SettlementOutcome::Settled
        })
    }

    async fn mark_deposit_failed(
        &self,
        reference: &str,
        reason: &str,
    ) -> Result<(), WebhookError> {
        let mut client = self.connect().await?;
        client
            .mark_deposit_failed(MarkDepositFailedRequest {
                reference: reference.to_string(),
                reason: reason.to_string(),
            })
            .await
            .map_err(|e| {
                error!(reference, error = %e, "mark_deposit_failed RPC failed");
                WebhookError::Settlement(e.to_string())
            })?;
        Ok(())
    }
}
