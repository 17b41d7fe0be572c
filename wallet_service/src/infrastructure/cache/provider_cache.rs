use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::cache::{CacheError, ProviderCache};
use crate::domain::entities::Provider;

pub struct RedisProviderCache {
    client: redis::Client,
}

impl RedisProviderCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn code_key(code: &str) -> String {
        format!("provider:code:{code}")
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl ProviderCache for RedisProviderCache {
    async fn get_by_code(&self, code: &str) -> Result<Option<Provider>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(Self::code_key(code))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        raw.map(|s| serde_json::from_str(&s).map_err(|e| CacheError::Backend(e.to_string())))
            .transpose()
    }

    async fn put(&self, provider: &Provider, ttl_seconds: i64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let payload =
            serde_json::to_string(provider).map_err(|e| CacheError::Backend(e.to_string()))?;

        let _: () = conn
            .set_ex(Self::code_key(&provider.code), payload, ttl_seconds as u64)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, provider: &Provider) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(Self::code_key(&provider.code))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
