//! Cross-cutting error taxonomy (§7), independent of transport.
//!
//! Each bounded context keeps its own `thiserror` enum (`WalletError`,
//! `ProviderError`, ...); this module only standardizes the *kind* every
//! such error maps to, so each crate's `api::error` module can turn a kind
//! into a status code the same way everywhere.

/// Domain error kind, not a transport status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: 400.
    Validation,
    /// Missing/invalid token, revoked session, insufficient role: 401/403.
    Auth,
    /// Unknown wallet, user, transaction: 404.
    NotFound,
    /// Idempotency-key reuse with different payload, duplicate reference: 409.
    Conflict,
    /// No eligible provider, or gateway call failed: 502/503.
    ProviderUnavailable,
    /// Withdrawal/transfer would drive a balance negative: 422.
    InsufficientBalance,
    /// Storage failure, unexpected exception: 500.
    Internal,
}

/// Implemented by every crate-local domain error enum so its API layer can
/// dispatch on `.kind()` instead of re-deriving the taxonomy per crate.
pub trait DomainError: std::error::Error {
    fn kind(&self) -> ErrorKind;
}
