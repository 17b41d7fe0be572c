use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{ProviderError, TenantError, UserError, WalletError};
use crate::domain::types::{
    IdempotencyKeyId, ProviderId, Role, TenantId, TransactionId, TransactionStatus,
    TransactionType, UserId, WalletId, WalletTypeId,
};

/// A merchant-application boundary. Every user, transaction, and outbound
/// webhook is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: String, slug: String, webhook_url: Option<String>) -> Result<Self, TenantError> {
        if name.trim().is_empty() || slug.trim().is_empty() {
            return Err(TenantError::InvalidData(
                "name and slug are required".into(),
            ));
        }
        Ok(Self {
            id: TenantId::new(),
            name,
            slug: slug.trim().to_lowercase(),
            webhook_url,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        tenant_id: TenantId,
        email: String,
        phone: Option<String>,
        password_hash: String,
        role: Role,
    ) -> Result<Self, UserError> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(UserError::InvalidData("a valid email is required".into()));
        }
        Ok(Self {
            id: UserId::new(),
            tenant_id,
            email: email.trim().to_lowercase(),
            phone,
            password_hash,
            role,
            active: true,
            created_at: Utc::now(),
        })
    }
}

/// Reference data: a currency the platform knows how to hold a wallet in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletType {
    pub id: WalletTypeId,
    pub currency_code: String,
    pub active: bool,
}

/// A per-user, per-currency balance. Mutated only under a row lock, inside
/// a transaction that also writes the matching ledger row — see
/// `infrastructure::persistence::wallet_repository::lock_for_update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub wallet_type_id: WalletTypeId,
    pub currency_code: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// A fresh, zero-balance wallet for a (user, wallet-type) pair. Used at
    /// signup to materialize one wallet per active wallet type.
    pub fn new_zero_balance(
        user_id: UserId,
        wallet_type_id: WalletTypeId,
        currency_code: String,
    ) -> Result<Self, WalletError> {
        let currency_code = currency_code.trim().to_uppercase();
        if currency_code.len() != 3 {
            return Err(WalletError::InvalidData(
                "currency code must be a 3-letter ISO code".into(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: WalletId::new(),
            user_id,
            wallet_type_id,
            currency_code,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ProviderMetrics {
    pub priority: i32,
    pub success_count: i32,
    pub failure_count: i32,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl ProviderMetrics {
    pub fn starting() -> Self {
        Self {
            priority: 100,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.priority = (self.priority - 10).max(0);
        self.success_count += 1;
        self.last_success_at = Some(Utc::now());
    }

    pub fn record_failure(&mut self) {
        self.priority += 20;
        self.failure_count += 1;
        self.last_failure_at = Some(Utc::now());
    }

    pub fn decay(&mut self) {
        self.priority = (self.priority - 5).max(0);
    }

    pub fn reset_daily(&mut self) {
        self.priority = 100;
        self.success_count = 0;
        self.failure_count = 0;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub code: String,
    pub display_name: String,
    pub config: ProviderConfig,
    pub active: bool,
    pub supported_currencies: Vec<String>,
    pub supported_channels: Vec<String>,
    pub metrics: ProviderMetrics,
}

impl Provider {
    pub fn new(
        code: String,
        display_name: String,
        config: ProviderConfig,
        supported_currencies: Vec<String>,
        supported_channels: Vec<String>,
    ) -> Result<Self, ProviderError> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return Err(ProviderError::InvalidData("code is required".into()));
        }
        Ok(Self {
            id: ProviderId::new(),
            code,
            display_name,
            config,
            active: true,
            supported_currencies: supported_currencies
                .into_iter()
                .map(|c| c.to_uppercase())
                .collect(),
            supported_channels: supported_channels
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect(),
            metrics: ProviderMetrics::starting(),
        })
    }

    /// `active ∧ supports(currency) ∧ supports(channel)`, per §4.3.
    pub fn is_eligible_for(&self, currency: &str, channel: &str) -> bool {
        self.active
            && self
                .supported_currencies
                .iter()
                .any(|c| c.eq_ignore_ascii_case(currency))
            && self
                .supported_channels
                .iter()
                .any(|c| c.eq_ignore_ascii_case(channel))
    }
}

/// The ledger row. Authoritative record of an attempted or completed money
/// movement; transitions `pending -> {completed | failed}` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub tenant_id: TenantId,
    pub wallet_id: WalletId,
    pub provider_id: Option<ProviderId>,
    pub currency_code: String,
    pub reference: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub fee: Decimal,
    pub metadata: Value,
    pub error_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized, tenant-visible projection of a deposit. Never authoritative
/// for balance; mirrors the ledger row's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub transaction_id: TransactionId,
    pub external_tx_id: Option<String>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized, tenant-visible projection of a withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cached replay record for a (tenant, key, endpoint) tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyKey {
    pub id: IdempotencyKeyId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub key: String,
    pub endpoint: String,
    pub request_hash: String,
    pub response_body: Value,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}
