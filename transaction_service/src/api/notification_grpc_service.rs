//! Server side of the tenant-notification RPC: wallet_service calls this
//! right after a deposit settles or fails so C10 fires outside the
//! in-process event bus, which cannot cross the boundary between the two
//! binaries.

use std::str::FromStr;
use std::sync::Arc;

use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::proto::notifications::tenant_notification_service_server::TenantNotificationService;
use crate::api::proto::notifications::{NotifyTenantEventRequest, NotifyTenantEventResponse};
use crate::domain::types::TenantId;
use crate::use_cases::emit_tenant_webhook::EmitTenantWebhookUseCase;

pub struct TenantNotificationGrpcService {
    emit_tenant_webhook: Arc<EmitTenantWebhookUseCase>,
}

impl TenantNotificationGrpcService {
    pub fn new(emit_tenant_webhook: Arc<EmitTenantWebhookUseCase>) -> Self {
        Self { emit_tenant_webhook }
    }
}

#[tonic::async_trait]
impl TenantNotificationService for TenantNotificationGrpcService {
    async fn notify_tenant_event(
        &self,
        request: Request<NotifyTenantEventRequest>,
    ) -> Result<Response<NotifyTenantEventResponse>, Status> {
        let req = request.into_inner();

        let tenant_id = Uuid::from_str(&req.tenant_id)
            .map(TenantId::from_uuid)
            .map_err(|e| Status::invalid_argument(format!("invalid tenant_id: {e}")))?;
        let payload: serde_json::Value = serde_json::from_str(&req.payload_json)
            .map_err(|e| Status::invalid_argument(format!("invalid payload_json: {e}")))?;

        self.emit_tenant_webhook
            .execute(tenant_id, &req.event_type, payload)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(NotifyTenantEventResponse {}))
    }
}
