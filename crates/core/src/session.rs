//! Session-scoped context passed explicitly into every service call.

use serde::{Deserialize, Serialize};

use crate::id::{ShopId, UserId};

/// Dashboard role of the acting user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    /// Shop owner.
    Admin,
    SalesPerson,
    RepairMan,
    Wholesaler,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::SalesPerson => "sales_person",
            Role::RepairMan => "repair_man",
            Role::Wholesaler => "wholesaler",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is acting, and in which shop.
///
/// Every repository and service call is scoped by the `shop_id` carried here;
/// nothing reads the acting user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub role: Role,
}

impl SessionContext {
    pub fn new(shop_id: ShopId, user_id: UserId, role: Role) -> Self {
        Self {
            shop_id,
            user_id,
            role,
        }
    }
}
