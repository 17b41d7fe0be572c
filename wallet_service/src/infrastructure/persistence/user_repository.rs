use crate::domain::entities::User;
use crate::domain::error::UserError;
use crate::domain::repository::UserRepository;
use crate::domain::types::{TenantId, UserId};
use crate::infrastructure::persistence::models::UserModel;
use async_trait::async_trait;
use sqlx::PgPool;

/// Repositorio de Usuarios basado en PostgreSQL.
///
/// Implementa la interfaz de dominio `UserRepository` utilizando `sqlx` para
/// interactuar con la base de datos de manera asíncrona y segura (params binding).
///
/// Esta capa actúa como un adaptador:
/// - Recibe entidades de dominio (`User`).
/// - Las convierte a modelos de persistencia (`UserModel`).
/// - Ejecuta consultas SQL.
/// - Devuelve entidades de dominio, aislando al núcleo de la lógica de la DB.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Crea una nueva instancia inyectando el pool de conexiones.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    /// Busca un usuario por su ID único.
    ///
    /// Retorna `None` si el usuario no existe, en lugar de un error.
    /// Utiliza `fetch_optional` para manejar elegantemente el caso de "no encontrado".
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError> {
        // Consultamos el modelo de base de datos
        let model_opt = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT * FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Repository(e.to_string()))?;

        Ok(model_opt.map(|m| m.into()))
    }

    /// Busca un usuario por tenant y correo, único por `(tenant_id, email)`.
    async fn find_by_tenant_and_email(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<Option<User>, UserError> {
        let model_opt = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT * FROM users
            WHERE tenant_id = $1 AND email = $2
            "#,
        )
        .bind(tenant_id)
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Repository(e.to_string()))?;

        Ok(model_opt.map(|m| m.into()))
    }

    async fn find_platform_admin_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let model_opt = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT * FROM users
            WHERE email = $1 AND role = 'PLATFORM_ADMIN'
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Repository(e.to_string()))?;

        Ok(model_opt.map(|m| m.into()))
    }

    /// Persiste un nuevo usuario en la base de datos.
    async fn create(&self, user: User) -> Result<User, UserError> {
        let model = UserModel::from(user);
        let email_for_error = model.email.clone();

        let saved_model = sqlx::query_as::<_, UserModel>(
            r#"
            INSERT INTO users (
                id, tenant_id, email, phone, password_hash, role, active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(model.tenant_id)
        .bind(model.email)
        .bind(model.phone)
        .bind(model.password_hash)
        .bind(model.role)
        .bind(model.active)
        .bind(model.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let error_msg = e.to_string();
            if error_msg.contains("users_tenant_id_email") {
                UserError::EmailTaken(email_for_error)
            } else {
                UserError::Repository(error_msg)
            }
        })?;

        Ok(saved_model.into())
    }
}
