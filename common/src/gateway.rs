//! Gateway adapters (C4): a uniform capability over heterogeneous payment
//! processor APIs. Lives in `common` because both `wallet_service` (deposit
//! initiation) and `transaction_service` (reconciliation verify) need it.
//!
//! Grounded in the original service's `provider/gateways/{paystack,flutterwave}.go`:
//! Paystack signs the raw webhook body with HMAC-SHA512 under the secret
//! key; Flutterwave just echoes a shared secret header. Adapter selection is
//! the sum type the design notes prescribe instead of a trait-object
//! registry — adding a gateway means adding a variant, not a plugin slot.

use crate::money::to_minor_units;
use crate::webhook_sig::{verify_flutterwave_signature, verify_paystack_signature};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaystackConfig {
    pub base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlutterwaveConfig {
    pub base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

/// A provider's JSON config, as persisted. Decoded into the variant picked
/// by the provider's `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitDepositRequest {
    pub email: String,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitDepositResponse {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifiedStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTransactionResponse {
    pub status: VerifiedStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub reference: String,
    pub raw: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("gateway returned an unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// The single capability every adapter exposes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn init_deposit(
        &self,
        req: &InitDepositRequest,
    ) -> Result<InitDepositResponse, GatewayError>;

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifyTransactionResponse, GatewayError>;

    fn verify_signature(&self, body: &[u8], signature_header: &str) -> bool;

    /// Stable lowercase key matching `Provider.code`.
    fn code(&self) -> &'static str;
}

/// Provider-code -> adapter sum type. New gateways add a variant here plus
/// one impl below; no dynamic registry.
pub enum GatewayAdapter {
    Paystack(PaystackGateway),
    Flutterwave(FlutterwaveGateway),
}

impl GatewayAdapter {
    pub fn paystack(config: PaystackConfig, client: reqwest::Client) -> Self {
        Self::Paystack(PaystackGateway { config, client })
    }

    pub fn flutterwave(config: FlutterwaveConfig, client: reqwest::Client) -> Self {
        Self::Flutterwave(FlutterwaveGateway { config, client })
    }

    fn inner(&self) -> &dyn PaymentGateway {
        match self {
            GatewayAdapter::Paystack(g) => g,
            GatewayAdapter::Flutterwave(g) => g,
        }
    }
}

#[async_trait]
impl PaymentGateway for GatewayAdapter {
    async fn init_deposit(
        &self,
        req: &InitDepositRequest,
    ) -> Result<InitDepositResponse, GatewayError> {
        self.inner().init_deposit(req).await
    }

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifyTransactionResponse, GatewayError> {
        self.inner().verify_transaction(reference).await
    }

    fn verify_signature(&self, body: &[u8], signature_header: &str) -> bool {
        self.inner().verify_signature(body, signature_header)
    }

    fn code(&self) -> &'static str {
        self.inner().code()
    }
}

pub struct PaystackGateway {
    config: PaystackConfig,
    client: reqwest::Client,
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn init_deposit(
        &self,
        req: &InitDepositRequest,
    ) -> Result<InitDepositResponse, GatewayError> {
        let amount_minor = to_minor_units(req.amount, &req.currency);
        let body = serde_json::json!({
            "email": req.email,
            "amount": amount_minor,
            "currency": req.currency,
            "reference": req.reference,
            "metadata": req.metadata,
        });

        let resp: Value = self
            .client
            .post(format!("{}/transaction/initialize", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)?;

        let data = resp
            .get("data")
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing data field".into()))?;
        let authorization_url = data
            .get("authorization_url")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing authorization_url".into()))?
            .to_string();
        let reference = data
            .get("reference")
            .and_then(Value::as_str)
            .unwrap_or(&req.reference)
            .to_string();

        Ok(InitDepositResponse {
            authorization_url,
            reference,
        })
    }

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifyTransactionResponse, GatewayError> {
        let resp: Value = self
            .client
            .get(format!(
                "{}/transaction/verify/{}",
                self.config.base_url, reference
            ))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)?;

        let data = resp
            .get("data")
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing data field".into()))?;
        let raw_status = data.get("status").and_then(Value::as_str).unwrap_or("");
        let status = if raw_status == "success" {
            VerifiedStatus::Success
        } else {
            VerifiedStatus::Failed
        };
        let amount_minor = data.get("amount").and_then(Value::as_i64).unwrap_or(0);
        let currency = data
            .get("currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(VerifyTransactionResponse {
            status,
            amount_minor,
            currency,
            reference: reference.to_string(),
            raw: resp,
        })
    }

    fn verify_signature(&self, body: &[u8], signature_header: &str) -> bool {
        verify_paystack_signature(&self.config.webhook_secret, body, signature_header)
    }

    fn code(&self) -> &'static str {
        "paystack"
    }
}

pub struct FlutterwaveGateway {
    config: FlutterwaveConfig,
    client: reqwest::Client,
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    async fn init_deposit(
        &self,
        req: &InitDepositRequest,
    ) -> Result<InitDepositResponse, GatewayError> {
        let body = serde_json::json!({
            "tx_ref": req.reference,
            "amount": req.amount.to_string(),
            "currency": req.currency,
            "customer": { "email": req.email },
            "meta": req.metadata,
        });

        let resp: Value = self
            .client
            .post(format!("{}/payments", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)?;

        let data = resp
            .get("data")
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing data field".into()))?;
        let authorization_url = data
            .get("link")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing link".into()))?
            .to_string();

        Ok(InitDepositResponse {
            authorization_url,
            reference: req.reference.clone(),
        })
    }

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifyTransactionResponse, GatewayError> {
        let resp: Value = self
            .client
            .get(format!(
                "{}/transactions/verify_by_reference",
                self.config.base_url
            ))
            .query(&[("tx_ref", reference)])
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)?;

        let data = resp
            .get("data")
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing data field".into()))?;
        let raw_status = data.get("status").and_then(Value::as_str).unwrap_or("");
        let status = if raw_status == "successful" {
            VerifiedStatus::Success
        } else {
            VerifiedStatus::Failed
        };
        let amount_minor = data
            .get("amount")
            .and_then(Value::as_f64)
            .map(|a| a as i64)
            .unwrap_or(0);
        let currency = data
            .get("currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(VerifyTransactionResponse {
            status,
            amount_minor,
            currency,
            reference: reference.to_string(),
            raw: resp,
        })
    }

    fn verify_signature(&self, _body: &[u8], signature_header: &str) -> bool {
        verify_flutterwave_signature(&self.config.webhook_secret, signature_header)
    }

    fn code(&self) -> &'static str {
        "flutterwave"
    }
}
