//! C6/C9's internal settlement RPC — `transaction_service`'s reconciliation
//! consumer calls this once a gateway transaction has been verified. Never
//! exposed outside the workspace network.

use std::str::FromStr;

use rust_decimal::Decimal;
use tonic::{Request, Response, Status};

use crate::api::proto::wallet::wallet_service_server::WalletService;
use crate::api::proto::wallet::{
    MarkDepositFailedRequest, MarkDepositFailedResponse, SettleDepositRequest, SettleDepositResponse,
};
use crate::domain::repository::SettlementOutcome;
use crate::use_cases::mark_deposit_failed::MarkDepositFailedUseCase;
use crate::use_cases::settle_deposit::SettleDepositUseCase;

pub struct WalletGrpcService {
    settle_deposit: SettleDepositUseCase,
    mark_deposit_failed: MarkDepositFailedUseCase,
}

impl WalletGrpcService {
    pub fn new(settle_deposit: SettleDepositUseCase, mark_deposit_failed: MarkDepositFailedUseCase) -> Self {
        Self {
            settle_deposit,
            mark_deposit_failed,
        }
    }
}

#[tonic::async_trait]
impl WalletService for WalletGrpcService {
    async fn settle_deposit(
        &self,
        request: Request<SettleDepositRequest>,
    ) -> Result<Response<SettleDepositResponse>, Status> {
        let req = request.into_inner();
        let amount = Decimal::from_str(&req.amount)
            .map_err(|e| Status::invalid_argument(format!("invalid amount: {e}")))?;

        let outcome = self
            .settle_deposit
            .execute(&req.reference, amount)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(SettleDepositResponse {
            already_settled: outcome == SettlementOutcome::AlreadySettled,
        }))
    }

    async fn mark_deposit_failed(
        &self,
        request: Request<MarkDepositFailedRequest>,
    ) -> Result<Response<MarkDepositFailedResponse>, Status> {
        let req = request.into_inner();

        self.mark_deposit_failed
            .execute(&req.reference, &req.reason)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(MarkDepositFailedResponse {}))
    }
}
