use serde::{Deserialize, Serialize};
use std::fmt;

/// Role ∈ {PLATFORM_ADMIN, TENANT_ADMIN, USER}, per the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    PlatformAdmin,
    TenantAdmin,
    User,
}

impl Role {
    /// Whether this role is one of the endpoint's allowed roles.
    pub fn is_allowed(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::PlatformAdmin => "PLATFORM_ADMIN",
            Role::TenantAdmin => "TENANT_ADMIN",
            Role::User => "USER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLATFORM_ADMIN" => Ok(Role::PlatformAdmin),
            "TENANT_ADMIN" => Ok(Role::TenantAdmin),
            "USER" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
