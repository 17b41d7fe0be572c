pub mod idempotency_repository;
pub mod ledger_repository;
pub mod models;
pub mod provider_repository;
pub mod tenant_repository;
pub mod transaction_repository;
pub mod user_repository;
pub mod wallet_repository;
pub mod wallet_type_repository;
