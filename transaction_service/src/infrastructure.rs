pub mod gateway_registry;
pub mod gateways;
pub mod persistence;
