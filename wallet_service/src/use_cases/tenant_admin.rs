use std::sync::Arc;

use crate::domain::entities::Tenant;
use crate::domain::error::TenantError;
use crate::domain::repository::TenantRepository;
use crate::domain::types::TenantId;

/// `POST /tenant`: PLATFORM_ADMIN-only onboarding of a new merchant boundary.
#[derive(Clone)]
pub struct CreateTenantUseCase {
    tenant_repo: Arc<dyn TenantRepository>,
}

impl CreateTenantUseCase {
    pub fn new(tenant_repo: Arc<dyn TenantRepository>) -> Self {
        Self { tenant_repo }
    }

    #[tracing::instrument(name = "CreateTenantUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        name: String,
        slug: String,
        webhook_url: Option<String>,
    ) -> Result<Tenant, TenantError> {
        if self.tenant_repo.find_by_slug(&slug).await?.is_some() {
            return Err(TenantError::SlugTaken(slug));
        }

        let tenant = Tenant::new(name, slug, webhook_url)?;
        self.tenant_repo.create(tenant).await
    }
}

/// `GET /tenant/:id`: looks up a single tenant by id.
#[derive(Clone)]
pub struct GetTenantUseCase {
    tenant_repo: Arc<dyn TenantRepository>,
}

impl GetTenantUseCase {
    pub fn new(tenant_repo: Arc<dyn TenantRepository>) -> Self {
        Self { tenant_repo }
    }

    #[tracing::instrument(name = "GetTenantUseCase::execute", skip(self))]
    pub async fn execute(&self, id: TenantId) -> Result<Tenant, TenantError> {
        self.tenant_repo
            .find_by_id(id)
            .await?
            .ok_or(TenantError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockTenantRepository;

    #[tokio::test]
    async fn create_tenant_rejects_taken_slug() {
        let mut tenant_repo = MockTenantRepository::new();
        tenant_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|slug| {
                Ok(Some(
                    Tenant::new("Existing".into(), slug.to_string(), None).unwrap(),
                ))
            });

        let use_case = CreateTenantUseCase::new(Arc::new(tenant_repo));
        let result = use_case
            .execute("Acme".into(), "acme".into(), None)
            .await;

        assert!(matches!(result, Err(TenantError::SlugTaken(s)) if s == "acme"));
    }

    #[tokio::test]
    async fn create_tenant_succeeds_for_new_slug() {
        let mut tenant_repo = MockTenantRepository::new();
        tenant_repo.expect_find_by_slug().times(1).returning(|_| Ok(None));
        tenant_repo.expect_create().times(1).returning(|t| Ok(t));

        let use_case = CreateTenantUseCase::new(Arc::new(tenant_repo));
        let tenant = use_case
            .execute("Acme".into(), "acme".into(), Some("https://acme.test/hook".into()))
            .await
            .unwrap();

        assert_eq!(tenant.slug, "acme");
    }

    #[tokio::test]
    async fn get_tenant_not_found() {
        let mut tenant_repo = MockTenantRepository::new();
        let id = TenantId::new();
        tenant_repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let use_case = GetTenantUseCase::new(Arc::new(tenant_repo));
        let result = use_case.execute(id).await;

        assert!(matches!(result, Err(TenantError::NotFound(found)) if found == id));
    }
}
