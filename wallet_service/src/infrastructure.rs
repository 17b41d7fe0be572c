pub mod cache;
pub mod gateways;
pub mod password;
pub mod persistence;
pub mod tenant_notifier;
