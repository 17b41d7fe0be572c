//! Grounded in `internal/infrastructure/cache/session.go`'s `RedisSessionStore`:
//! two keyspaces, `session:{token-id}` and `user_token:{user-id}`, same TTL.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::cache::{CacheError, Session, SessionStore};
use crate::domain::types::{SessionId, UserId};

pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn session_key(token_id: SessionId) -> String {
        format!("session:{token_id}")
    }

    fn user_token_key(user_id: UserId) -> String {
        format!("user_token:{user_id}")
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set_session(&self, session: &Session, ttl_seconds: i64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        // At most one active session per user: a prior session is deleted
        // before the new one is written.
        let previous: Option<String> = conn
            .get(Self::user_token_key(session.user_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        if let Some(previous_token) = previous {
            let _: () = conn
                .del(format!("session:{previous_token}"))
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;
        }

        let payload = serde_json::to_string(session)
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        let _: () = conn
            .set_ex(Self::session_key(session.token_id), payload, ttl_seconds as u64)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        let _: () = conn
            .set_ex(
                Self::user_token_key(session.user_id),
                session.token_id.to_string(),
                ttl_seconds as u64,
            )
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get_session(&self, token_id: SessionId) -> Result<Option<Session>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(Self::session_key(token_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        raw.map(|s| serde_json::from_str(&s).map_err(|e| CacheError::Backend(e.to_string())))
            .transpose()
    }

    async fn delete_session(&self, token_id: SessionId) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(Self::session_key(token_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_token_id_for_user(&self, user_id: UserId) -> Result<Option<SessionId>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(Self::user_token_key(user_id))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        raw.map(|s| {
            s.parse::<uuid::Uuid>()
                .map(SessionId::from_uuid)
                .map_err(|e| CacheError::Backend(e.to_string()))
        })
        .transpose()
    }
}
