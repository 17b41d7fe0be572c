use crate::domain::entities::User;

/// The pair of tokens `/auth/login`, `/auth/admin`, and `/auth/refresh` all
/// return, alongside the user they were issued for.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
