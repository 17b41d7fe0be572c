pub mod emit_tenant_webhook;
pub mod handle_webhook;
pub mod reconcile;
