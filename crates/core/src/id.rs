//! Strongly-typed identifiers used across the domain.
//!
//! Every table of the persisted schema gets its own newtype so a `ProductId`
//! can never be passed where a `CategoryId` is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a shop (the data-isolation boundary).
    ShopId,
    "ShopId"
);
uuid_newtype!(
    /// Identifier of a user (staff member acting in a shop).
    UserId,
    "UserId"
);
uuid_newtype!(ProductId, "ProductId");
uuid_newtype!(CategoryId, "CategoryId");
uuid_newtype!(SaleId, "SaleId");
uuid_newtype!(SaleItemId, "SaleItemId");
uuid_newtype!(
    /// Identifier of a stock movement (restock, removal, wastage or sale).
    MovementId,
    "MovementId"
);
uuid_newtype!(ActivityLogId, "ActivityLogId");
uuid_newtype!(NotificationId, "NotificationId");
