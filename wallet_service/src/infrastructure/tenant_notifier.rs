//! gRPC client edge into `transaction_service`'s `TenantNotificationService`,
//! the reverse direction of `api::grpc_service::WalletGrpcService`: this
//! service initiates the call, `transaction_service` serves it.

use async_trait::async_trait;
use serde_json::Value;
use tonic::transport::Channel;
use tracing::error;

use crate::api::proto::notifications::tenant_notification_service_client::TenantNotificationServiceClient;
use crate::api::proto::notifications::NotifyTenantEventRequest;
use crate::domain::error::WalletError;
use crate::domain::repository::TenantNotifier;
use crate::domain::types::TenantId;

pub struct GrpcTenantNotifier {
    transaction_service_addr: String,
}

impl GrpcTenantNotifier {
    pub fn new(transaction_service_addr: String) -> Self {
        Self {
            transaction_service_addr,
        }
    }

    async fn connect(&self) -> Result<TenantNotificationServiceClient<Channel>, WalletError> {
        TenantNotificationServiceClient::connect(self.transaction_service_addr.clone())
            .await
            .map_err(|e| WalletError::Repository(format!("connect to transaction_service: {e}")))
    }
}

#[async_trait]
impl TenantNotifier for GrpcTenantNotifier {
    async fn notify(&self, tenant_id: TenantId, event_type: &str, payload: Value) -> Result<(), WalletError> {
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| WalletError::Repository(format!("serialize notification payload: {e}")))?;

        let mut client = self.connect().await?;
        client
            .notify_tenant_event(NotifyTenantEventRequest {
                tenant_id: tenant_id.into_uuid().to_string(),
                event_type: event_type.to_string(),
                payload_json,
            })
            .await
            .map_err(|e| {
                error!(%tenant_id, event_type, error = %e, "notify_tenant_event RPC failed");
                WalletError::Repository(e.to_string())
            })?;

        Ok(())
    }
}
