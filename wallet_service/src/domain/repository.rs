//! Repository traits (ports). Kept object-safe and `mockall`-mockable in
//! tests.
//!
//! The `WithTx(handle)` rebind doesn't translate cleanly into a
//! trait-object world (the tx's lifetime would have to leak into the trait
//! object), so the money-movement flows are exposed as single composite
//! methods on `LedgerRepository` that open, use, and commit their own
//! `sqlx::Transaction` internally — the wallet row lock and the ledger
//! write happen inside one method body instead of being stitched together
//! by the caller. Each method is still one atomic unit exactly like the
//! spec requires; see DESIGN.md for the full rationale.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::entities::{
    Deposit, IdempotencyKey, Provider, Tenant, Transaction, User, Wallet, WalletType, Withdrawal,
};
use crate::domain::error::{
    IdempotencyError, ProviderError, TenantError, TransactionError, UserError, WalletError,
    WalletTypeError,
};
use crate::domain::types::{
    IdempotencyKeyId, ProviderId, TenantId, TransactionId, TransactionStatus, UserId, WalletId,
};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, TenantError>;
    async fn create(&self, tenant: Tenant) -> Result<Tenant, TenantError>;
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError>;
    async fn find_by_tenant_and_email(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<Option<User>, UserError>;
    /// Tenant-agnostic lookup, used only by `/auth/admin` to find a
    /// `PLATFORM_ADMIN` row without a tenant-id in hand.
    async fn find_platform_admin_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
    async fn create(&self, user: User) -> Result<User, UserError>;
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait WalletRepository: Send + Sync {
    async fn find_by_id(&self, id: WalletId) -> Result<Option<Wallet>, WalletError>;
    async fn find_by_user_and_currency(
        &self,
        user_id: UserId,
        currency_code: &str,
    ) -> Result<Option<Wallet>, WalletError>;
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Wallet>, WalletError>;
    /// Creates one zero-balance wallet per currently-active wallet type, for
    /// a newly created user.
    async fn create_wallets_for_new_user(
        &self,
        user_id: UserId,
        wallet_types: &[WalletType],
    ) -> Result<Vec<Wallet>, WalletError>;
}

/// Reference data queried at signup to materialize one wallet per active
/// currency (§4.5 `CreateWalletsForNewUserFromAvailableWallets`).
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait WalletTypeRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<WalletType>, WalletTypeError>;
    async fn find_by_currency(&self, currency_code: &str) -> Result<Option<WalletType>, WalletTypeError>;
}

/// Outcome of a settlement attempt. `AlreadySettled` covers the idempotent
/// replay case (§4.6.4 step 2): the transaction was already `completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled,
    AlreadySettled,
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LedgerRepository: Send + Sync {
    /// §4.6.1 steps 6-7: insert the pending ledger row plus its mirror
    /// deposit row. Called only after the gateway call has already
    /// succeeded, so this never needs to roll back a provider call.
    async fn initiate_deposit(
        &self,
        tenant_id: TenantId,
        wallet_id: WalletId,
        provider_id: ProviderId,
        reference: String,
        amount: Decimal,
        currency_code: String,
        metadata: Value,
    ) -> Result<(Transaction, Deposit), WalletError>;

    /// §4.6.2: lock the wallet, debit if sufficient, record the ledger row
    /// and its withdrawal mirror in one transaction.
    async fn withdraw(
        &self,
        tenant_id: TenantId,
        wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<(Transaction, Withdrawal), WalletError>;

    /// §4.6.3: lock both wallets in ascending id order, debit source,
    /// credit destination, record one `transfer` ledger row.
    async fn transfer(
        &self,
        tenant_id: TenantId,
        from_wallet_id: WalletId,
        to_wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<Transaction, WalletError>;

    /// §4.6.4: locate the transaction by reference, lock its wallet, credit
    /// the gateway-verified amount, flip status to `completed`. Returns
    /// `AlreadySettled` without mutating anything if the row is already
    /// `completed`.
    async fn settle_deposit(
        &self,
        reference: &str,
        amount_from_gateway: Decimal,
    ) -> Result<(Transaction, SettlementOutcome), WalletError>;

    /// §4.6.4 step 1: gateway verification itself failed. Idempotent if the
    /// row is already `failed`.
    async fn mark_deposit_failed(
        &self,
        reference: &str,
        reason: String,
    ) -> Result<Transaction, WalletError>;
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, TransactionError>;
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, TransactionError>;
    async fn list_for_wallets(
        &self,
        wallet_ids: &[WalletId],
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError>;
    /// Tenant-wide listing for admin roles (§6): every transaction under the
    /// tenant, not just the caller's own wallets.
    async fn list_for_tenant(
        &self,
        tenant_id: TenantId,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError>;
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProviderRepository: Send + Sync {
    async fn find_by_id(&self, id: ProviderId) -> Result<Option<Provider>, ProviderError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Provider>, ProviderError>;
    async fn create(&self, provider: Provider) -> Result<Provider, ProviderError>;
    async fn list_all(&self) -> Result<Vec<Provider>, ProviderError>;

    /// Deterministic selection per §4.3: eligible, ordered by
    /// `(priority ASC, success_count DESC)`, first row wins.
    async fn select_best(
        &self,
        currency_code: &str,
        channel: &str,
    ) -> Result<Option<Provider>, ProviderError>;

    async fn record_success(&self, id: ProviderId) -> Result<(), ProviderError>;
    async fn record_failure(&self, id: ProviderId) -> Result<(), ProviderError>;
    async fn decay_all(&self) -> Result<(), ProviderError>;
    async fn reset_daily_all(&self) -> Result<(), ProviderError>;
}

/// C10's inbound edge on this side: called right after a deposit settles or
/// fails so the tenant webhook delivery fires even though the event bus
/// can't cross the process boundary into `transaction_service`.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait TenantNotifier: Send + Sync {
    async fn notify(&self, tenant_id: TenantId, event_type: &str, payload: Value) -> Result<(), WalletError>;
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait IdempotencyRepository: Send + Sync {
    async fn find(
        &self,
        tenant_id: TenantId,
        key: &str,
        endpoint: &str,
    ) -> Result<Option<IdempotencyKey>, IdempotencyError>;

    async fn create(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        key: String,
        endpoint: String,
        request_hash: String,
        response_body: Value,
        status_code: i32,
    ) -> Result<IdempotencyKeyId, IdempotencyError>;
}
