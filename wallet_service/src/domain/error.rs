use crate::domain::types::{ProviderId, TenantId, TransactionId, UserId, WalletId};
use common::error::{DomainError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TenantError {
    #[error("tenant not found: {0}")]
    NotFound(TenantId),
    #[error("tenant slug already taken: {0}")]
    SlugTaken(String),
    #[error("invalid tenant data: {0}")]
    InvalidData(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for TenantError {
    fn kind(&self) -> ErrorKind {
        match self {
            TenantError::NotFound(_) => ErrorKind::NotFound,
            TenantError::SlugTaken(_) => ErrorKind::Conflict,
            TenantError::InvalidData(_) => ErrorKind::Validation,
            TenantError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(UserId),
    #[error("email already registered in tenant: {0}")]
    EmailTaken(String),
    #[error("invalid user data: {0}")]
    InvalidData(String),
    #[error("user account is inactive")]
    Inactive,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for UserError {
    fn kind(&self) -> ErrorKind {
        match self {
            UserError::NotFound(_) => ErrorKind::NotFound,
            UserError::EmailTaken(_) => ErrorKind::Conflict,
            UserError::InvalidData(_) => ErrorKind::Validation,
            UserError::Inactive | UserError::InvalidCredentials => ErrorKind::Auth,
            UserError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet not found: {0}")]
    NotFound(WalletId),
    #[error("user has no wallet for currency: {0}")]
    NoWalletForCurrency(String),
    #[error("invalid wallet data: {0}")]
    InvalidData(String),
    #[error("insufficient balance in wallet: {0}")]
    InsufficientBalance(WalletId),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("source and destination wallet are the same: {0}")]
    SameWallet(WalletId),
    #[error("transaction reference already exists: {0}")]
    DuplicateReference(String),
    #[error("caller does not own wallet: {0}")]
    Forbidden(WalletId),
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for WalletError {
    fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NotFound(_) | WalletError::NoWalletForCurrency(_) => ErrorKind::NotFound,
            WalletError::InvalidData(_) | WalletError::InvalidAmount(_) => ErrorKind::Validation,
            WalletError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            WalletError::SameWallet(_) => ErrorKind::Validation,
            WalletError::DuplicateReference(_) => ErrorKind::Conflict,
            WalletError::Forbidden(_) => ErrorKind::Auth,
            WalletError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletTypeError {
    #[error("wallet type not found for currency: {0}")]
    NotFound(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for WalletTypeError {
    fn kind(&self) -> ErrorKind {
        match self {
            WalletTypeError::NotFound(_) => ErrorKind::NotFound,
            WalletTypeError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider not found: {0}")]
    NotFound(ProviderId),
    #[error("no eligible provider for currency {currency} and channel {channel}")]
    NoEligibleProvider { currency: String, channel: String },
    #[error("invalid provider data: {0}")]
    InvalidData(String),
    #[error("gateway call failed: {0}")]
    GatewayFailed(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for ProviderError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::NotFound(_) => ErrorKind::NotFound,
            ProviderError::NoEligibleProvider { .. } => ErrorKind::ProviderUnavailable,
            ProviderError::InvalidData(_) => ErrorKind::Validation,
            ProviderError::GatewayFailed(_) => ErrorKind::ProviderUnavailable,
            ProviderError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("transaction not found: {0}")]
    NotFound(TransactionId),
    #[error("transaction reference already exists: {0}")]
    DuplicateReference(String),
    #[error("forbidden: caller does not own this transaction")]
    Forbidden,
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for TransactionError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::NotFound(_) => ErrorKind::NotFound,
            TransactionError::DuplicateReference(_) => ErrorKind::Conflict,
            TransactionError::Forbidden => ErrorKind::Auth,
            TransactionError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum IdempotencyError {
    #[error("idempotency key reused with a different request body: {0}")]
    Conflict(String),
    #[error("missing required Idempotency-Key header")]
    MissingKey,
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for IdempotencyError {
    fn kind(&self) -> ErrorKind {
        match self {
            IdempotencyError::Conflict(_) => ErrorKind::Conflict,
            IdempotencyError::MissingKey => ErrorKind::Validation,
            IdempotencyError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing or malformed authorization header")]
    MissingToken,
    #[error("token is invalid or expired")]
    InvalidToken,
    #[error("session has been revoked")]
    TokenRevoked,
    #[error("role {0} is not permitted to perform this action")]
    Forbidden(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("cache error: {0}")]
    Cache(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenRevoked
            | AuthError::InvalidCredentials => ErrorKind::Auth,
            AuthError::Forbidden(_) => ErrorKind::Auth,
            AuthError::Cache(_) | AuthError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Deposit initiation spans the wallet, provider, and gateway bounded
/// contexts; this is what `InitiateDepositUseCase::execute` actually returns.
#[derive(Error, Debug)]
pub enum DepositError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("gateway call failed: {0}")]
    Gateway(String),
}

impl DomainError for DepositError {
    fn kind(&self) -> ErrorKind {
        match self {
            DepositError::Wallet(e) => e.kind(),
            DepositError::Provider(e) => e.kind(),
            DepositError::Gateway(_) => ErrorKind::ProviderUnavailable,
        }
    }
}

/// One entry point's worth of idempotency-key bookkeeping can fail for
/// reasons spanning several of the above; this is the enum use cases that
/// wrap a handler behind C2 actually return.
#[derive(Error, Debug)]
pub enum IdempotentCallError<E: std::fmt::Debug> {
    #[error(transparent)]
    Idempotency(#[from] IdempotencyError),
    #[error(transparent)]
    Handler(E),
}
