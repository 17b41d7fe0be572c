//! Builds a `common::gateway::GatewayAdapter` from a `Provider` row. The
//! adapter variant is picked by `Provider.code`; the shared `reqwest::Client`
//! is handed in by the caller so every adapter built here reuses one
//! connection pool.

use common::gateway::{FlutterwaveConfig, GatewayAdapter, PaystackConfig};
use thiserror::Error;

use crate::domain::entities::Provider;

#[derive(Debug, Error)]
pub enum GatewayFactoryError {
    #[error("unknown provider code: {0}")]
    UnknownCode(String),
}

pub fn build_adapter(
    provider: &Provider,
    client: reqwest::Client,
) -> Result<GatewayAdapter, GatewayFactoryError> {
    match provider.code.as_str() {
        "paystack" => Ok(GatewayAdapter::paystack(
            PaystackConfig {
                base_url: provider.config.base_url.clone(),
                secret_key: provider.config.secret_key.clone(),
                webhook_secret: provider.config.webhook_secret.clone(),
            },
            client,
        )),
        "flutterwave" => Ok(GatewayAdapter::flutterwave(
            FlutterwaveConfig {
                base_url: provider.config.base_url.clone(),
                secret_key: provider.config.secret_key.clone(),
                webhook_secret: provider.config.webhook_secret.clone(),
            },
            client,
        )),
        other => Err(GatewayFactoryError::UnknownCode(other.to_string())),
    }
}
