pub mod reconciliation_consumer;
pub mod retry_outbound_webhook;
