//! Newtype identifiers shared by both services.
//!
//! Follows the `UserId`/`WalletId` newtype pattern from the wallet service's
//! own `domain::types`, generalized to every entity that crosses a service
//! boundary (tenant, provider, transaction, webhook event).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(TenantId);
uuid_id!(UserId);
uuid_id!(WalletTypeId);
uuid_id!(WalletId);
uuid_id!(ProviderId);
uuid_id!(TransactionId);
uuid_id!(WebhookEventId);
uuid_id!(IdempotencyKeyId);
uuid_id!(SessionId);
