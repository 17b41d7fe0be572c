use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::Tenant;
use crate::domain::error::TenantError;
use crate::domain::repository::TenantRepository;
use crate::domain::types::TenantId;
use crate::infrastructure::persistence::models::TenantModel;

pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError> {
        let model = sqlx::query_as::<_, TenantModel>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TenantError::Repository(e.to_string()))?;
        Ok(model.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, TenantError> {
        let model = sqlx::query_as::<_, TenantModel>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TenantError::Repository(e.to_string()))?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, tenant: Tenant) -> Result<Tenant, TenantError> {
        let model = TenantModel::from(tenant);
        let saved = sqlx::query_as::<_, TenantModel>(
            r#"
            INSERT INTO tenants (id, name, slug, webhook_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(model.name)
        .bind(model.slug)
        .bind(model.webhook_url)
        .bind(model.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("tenants_slug") {
                TenantError::SlugTaken(e.to_string())
            } else {
                TenantError::Repository(e.to_string())
            }
        })?;
        Ok(saved.into())
    }
}
