//! SQLx row models and their domain conversions, one block per table.
//!
//! Provider's supported-currency/channel rows are folded into `TEXT[]`
//! columns on `providers` rather than the original schema's two join
//! tables — membership is all this service ever needs them for, and they
//! are written/read atomically with the rest of the provider row anyway.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::FromRow;

use crate::domain::entities::{
    Deposit, IdempotencyKey, Provider, ProviderConfig, ProviderMetrics, Tenant, Transaction, User,
    Wallet, WalletType, Withdrawal,
};
use crate::domain::types::{
    IdempotencyKeyId, ProviderId, TenantId, TransactionId, TransactionStatus, TransactionType,
    UserId, WalletId, WalletTypeId,
};

#[derive(Debug, FromRow)]
pub struct TenantModel {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Tenant> for TenantModel {
    fn from(t: Tenant) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            webhook_url: t.webhook_url,
            created_at: t.created_at,
        }
    }
}

impl From<TenantModel> for Tenant {
    fn from(m: TenantModel) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            webhook_url: m.webhook_url,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct UserModel {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: common::role::Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserModel {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            tenant_id: u.tenant_id,
            email: u.email,
            phone: u.phone,
            password_hash: u.password_hash,
            role: u.role,
            active: u.active,
            created_at: u.created_at,
        }
    }
}

impl From<UserModel> for User {
    fn from(m: UserModel) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            email: m.email,
            phone: m.phone,
            password_hash: m.password_hash,
            role: m.role,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct WalletTypeModel {
    pub id: WalletTypeId,
    pub currency_code: String,
    pub active: bool,
}

impl From<WalletTypeModel> for WalletType {
    fn from(m: WalletTypeModel) -> Self {
        Self {
            id: m.id,
            currency_code: m.currency_code,
            active: m.active,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct WalletModel {
    pub id: WalletId,
    pub user_id: UserId,
    pub wallet_type_id: WalletTypeId,
    pub currency_code: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Wallet> for WalletModel {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            wallet_type_id: w.wallet_type_id,
            currency_code: w.currency_code,
            balance: w.balance,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

impl From<WalletModel> for Wallet {
    fn from(m: WalletModel) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            wallet_type_id: m.wallet_type_id,
            currency_code: m.currency_code,
            balance: m.balance,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ProviderModel {
    pub id: ProviderId,
    pub code: String,
    pub display_name: String,
    pub config: Value,
    pub active: bool,
    pub supported_currencies: Vec<String>,
    pub supported_channels: Vec<String>,
    pub priority: i32,
    pub success_count: i32,
    pub failure_count: i32,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl From<Provider> for ProviderModel {
    fn from(p: Provider) -> Self {
        Self {
            id: p.id,
            code: p.code,
            display_name: p.display_name,
            config: serde_json::to_value(&p.config).unwrap_or(Value::Null),
            active: p.active,
            supported_currencies: p.supported_currencies,
            supported_channels: p.supported_channels,
            priority: p.metrics.priority,
            success_count: p.metrics.success_count,
            failure_count: p.metrics.failure_count,
            last_success_at: p.metrics.last_success_at,
            last_failure_at: p.metrics.last_failure_at,
        }
    }
}

impl TryFrom<ProviderModel> for Provider {
    type Error = serde_json::Error;

    fn try_from(m: ProviderModel) -> Result<Self, Self::Error> {
        let config: ProviderConfig = serde_json::from_value(m.config)?;
        Ok(Self {
            id: m.id,
            code: m.code,
            display_name: m.display_name,
            config,
            active: m.active,
            supported_currencies: m.supported_currencies,
            supported_channels: m.supported_channels,
            metrics: ProviderMetrics {
                priority: m.priority,
                success_count: m.success_count,
                failure_count: m.failure_count,
                last_success_at: m.last_success_at,
                last_failure_at: m.last_failure_at,
            },
        })
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionModel {
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

impl From<Transaction> for TransactionModel {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            tenant_id: t.tenant_id,
            wallet_id: t.wallet_id,
            provider_id: t.provider_id,
            currency_code: t.currency_code,
            reference: t.reference,
            transaction_type: t.transaction_type,
            status: t.status,
            amount: t.amount,
            fee: t.fee,
            metadata: t.metadata,
            error_reason: t.error_reason,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<TransactionModel> for Transaction {
    fn from(m: TransactionModel) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            wallet_id: m.wallet_id,
            provider_id: m.provider_id,
            currency_code: m.currency_code,
            reference: m.reference,
            transaction_type: m.transaction_type,
            status: m.status,
            amount: m.amount,
            fee: m.fee,
            metadata: m.metadata,
            error_reason: m.error_reason,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct DepositModel {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub transaction_id: TransactionId,
    pub external_tx_id: Option<String>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DepositModel> for Deposit {
    fn from(m: DepositModel) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            transaction_id: m.transaction_id,
            external_tx_id: m.external_tx_id,
            amount: m.amount,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct WithdrawalModel {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WithdrawalModel> for Withdrawal {
    fn from(m: WithdrawalModel) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            transaction_id: m.transaction_id,
            amount: m.amount,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct IdempotencyKeyModel {
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

impl From<IdempotencyKeyModel> for IdempotencyKey {
    fn from(m: IdempotencyKeyModel) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            user_id: m.user_id,
            key: m.key,
            endpoint: m.endpoint,
            request_hash: m.request_hash,
            response_body: m.response_body,
            status_code: m.status_code,
            created_at: m.created_at,
        }
    }
}
