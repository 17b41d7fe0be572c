pub mod error;
pub mod events;
pub mod gateway;
pub mod ids;
pub mod jwt;
pub mod money;
pub mod role;
pub mod webhook_sig;
