//! Cache capabilities (C1 session cache, C3 provider cache), kept as traits
//! so use cases depend on the capability rather than Redis directly —
//! mirrors how `domain::repository` traits decouple use cases from sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Provider;
use crate::domain::types::{SessionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token_id: SessionId,
    pub user_id: UserId,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub login_time: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub active: bool,
}

impl Session {
    pub fn new(token_id: SessionId, user_id: UserId, user_agent: Option<String>, ip: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            token_id,
            user_id,
            user_agent,
            ip,
            login_time: now,
            last_seen: now,
            active: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// C1. `session:{token-id}` and `user_token:{user-id}` keyspaces, matching
/// TTL. At most one active session per user: a login always deletes the
/// user's previous session before writing the new one.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    async fn set_session(
        &self,
        session: &Session,
        ttl_seconds: i64,
    ) -> Result<(), CacheError>;
    async fn get_session(&self, token_id: SessionId) -> Result<Option<Session>, CacheError>;
    async fn delete_session(&self, token_id: SessionId) -> Result<(), CacheError>;
    async fn get_token_id_for_user(&self, user_id: UserId) -> Result<Option<SessionId>, CacheError>;
}

/// C3. Provider rows cached by id and by code, 10-minute TTL; mutations
/// invalidate both keys.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProviderCache: Send + Sync {
    async fn get_by_code(&self, code: &str) -> Result<Option<Provider>, CacheError>;
    async fn put(&self, provider: &Provider, ttl_seconds: i64) -> Result<(), CacheError>;
    async fn invalidate(&self, provider: &Provider) -> Result<(), CacheError>;
}
