//! Mirrors `IncrementSuccess`, `IncrementFailure`, `DecayPriority`,
//! `ResetDailyMetrics`, and `SelectBestProviderByCurrencyAndChannel` from
//! the original sqlc-generated provider queries.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::cache::ProviderCache;
use crate::domain::entities::Provider;
use crate::domain::error::ProviderError;
use crate::domain::repository::ProviderRepository;
use crate::domain::types::ProviderId;
use crate::infrastructure::persistence::models::ProviderModel;

pub struct PostgresProviderRepository {
    pool: PgPool,
}

impl PostgresProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_domain(model: ProviderModel) -> Result<Provider, ProviderError> {
    Provider::try_from(model).map_err(|e| ProviderError::Repository(e.to_string()))
}

#[async_trait]
impl ProviderRepository for PostgresProviderRepository {
    async fn find_by_id(&self, id: ProviderId) -> Result<Option<Provider>, ProviderError> {
        let model = sqlx::query_as::<_, ProviderModel>("SELECT * FROM providers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ProviderError::Repository(e.to_string()))?;
        model.map(to_domain).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Provider>, ProviderError> {
        let model =
            sqlx::query_as::<_, ProviderModel>("SELECT * FROM providers WHERE code = $1")
                .bind(code.to_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ProviderError::Repository(e.to_string()))?;
        model.map(to_domain).transpose()
    }

    async fn create(&self, provider: Provider) -> Result<Provider, ProviderError> {
        let model = ProviderModel::from(provider);
        let saved = sqlx::query_as::<_, ProviderModel>(
            r#"
            INSERT INTO providers (
                id, code, display_name, config, active,
                supported_currencies, supported_channels,
                priority, success_count, failure_count, last_success_at, last_failure_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(model.code)
        .bind(model.display_name)
        .bind(model.config)
        .bind(model.active)
        .bind(model.supported_currencies)
        .bind(model.supported_channels)
        .bind(model.priority)
        .bind(model.success_count)
        .bind(model.failure_count)
        .bind(model.last_success_at)
        .bind(model.last_failure_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProviderError::Repository(e.to_string()))?;

        to_domain(saved)
    }

    async fn list_all(&self) -> Result<Vec<Provider>, ProviderError> {
        let models =
            sqlx::query_as::<_, ProviderModel>("SELECT * FROM providers ORDER BY code ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ProviderError::Repository(e.to_string()))?;
        models.into_iter().map(to_domain).collect()
    }

    async fn select_best(
        &self,
        currency_code: &str,
        channel: &str,
    ) -> Result<Option<Provider>, ProviderError> {
        let model = sqlx::query_as::<_, ProviderModel>(
            r#"
            SELECT * FROM providers
            WHERE active = true
              AND $1 = ANY(supported_currencies)
              AND $2 = ANY(supported_channels)
            ORDER BY priority ASC, success_count DESC
            LIMIT 1
            "#,
        )
        .bind(currency_code.to_uppercase())
        .bind(channel.to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProviderError::Repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn record_success(&self, id: ProviderId) -> Result<(), ProviderError> {
        sqlx::query(
            r#"
            UPDATE providers
            SET priority = GREATEST(priority - 10, 0),
                success_count = success_count + 1,
                last_success_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ProviderError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn record_failure(&self, id: ProviderId) -> Result<(), ProviderError> {
        sqlx::query(
            r#"
            UPDATE providers
            SET priority = priority + 20,
                failure_count = failure_count + 1,
                last_failure_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ProviderError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn decay_all(&self) -> Result<(), ProviderError> {
        sqlx::query("UPDATE providers SET priority = GREATEST(priority - 5, 0)")
            .execute(&self.pool)
            .await
            .map_err(|e| ProviderError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn reset_daily_all(&self) -> Result<(), ProviderError> {
        sqlx::query(
            "UPDATE providers SET priority = 100, success_count = 0, failure_count = 0",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ProviderError::Repository(e.to_string()))?;
        Ok(())
    }
}

/// C3's caching layer. `select_best`'s ordering is priority-sensitive and
/// always reads Postgres directly; only the by-code lookup (the path
/// `transaction_service`'s webhook ingress hits on every callback) goes
/// through the 10-minute-TTL cache, and every mutation invalidates it.
pub struct CachedProviderRepository {
    inner: PostgresProviderRepository,
    cache: Arc<dyn ProviderCache>,
}

impl CachedProviderRepository {
    pub fn new(inner: PostgresProviderRepository, cache: Arc<dyn ProviderCache>) -> Self {
        Self { inner, cache }
    }
}

const PROVIDER_CACHE_TTL_SECONDS: i64 = 10 * 60;

#[async_trait]
impl ProviderRepository for CachedProviderRepository {
    async fn find_by_id(&self, id: ProviderId) -> Result<Option<Provider>, ProviderError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Provider>, ProviderError> {
        if let Ok(Some(cached)) = self.cache.get_by_code(code).await {
            return Ok(Some(cached));
        }

        let provider = self.inner.find_by_code(code).await?;
        if let Some(p) = &provider {
            let _ = self.cache.put(p, PROVIDER_CACHE_TTL_SECONDS).await;
        }
        Ok(provider)
    }

    async fn create(&self, provider: Provider) -> Result<Provider, ProviderError> {
        let created = self.inner.create(provider).await?;
        let _ = self.cache.put(&created, PROVIDER_CACHE_TTL_SECONDS).await;
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Provider>, ProviderError> {
        self.inner.list_all().await
    }

    async fn select_best(
        &self,
        currency_code: &str,
        channel: &str,
    ) -> Result<Option<Provider>, ProviderError> {
        self.inner.select_best(currency_code, channel).await
    }

    async fn record_success(&self, id: ProviderId) -> Result<(), ProviderError> {
        self.inner.record_success(id).await?;
        if let Some(p) = self.inner.find_by_id(id).await? {
            let _ = self.cache.invalidate(&p).await;
        }
        Ok(())
    }

    async fn record_failure(&self, id: ProviderId) -> Result<(), ProviderError> {
        self.inner.record_failure(id).await?;
        if let Some(p) = self.inner.find_by_id(id).await? {
            let _ = self.cache.invalidate(&p).await;
        }
        Ok(())
    }

    async fn decay_all(&self) -> Result<(), ProviderError> {
        self.inner.decay_all().await
    }

    async fn reset_daily_all(&self) -> Result<(), ProviderError> {
        self.inner.reset_daily_all().await
    }
}
