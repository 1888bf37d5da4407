//! Audit and alert records (`activity_logs` and `notifications` tables).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use shopkeep_core::{ActivityLogId, Entity, NotificationId, ProductId, SessionContext, ShopId, UserId};
use shopkeep_products::StockLevel;

use crate::repository::StockChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    ProductCreated,
    ProductUpdated,
    ProductArchived,
    ProductActivated,
    ProductRemoved,
    CategoryCreated,
    CategoryRemoved,
    StockAdjusted,
    SaleCompleted,
}

/// Who did what, when, to which record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub entity_id: Option<Uuid>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn record(
        ctx: &SessionContext,
        action: ActivityAction,
        entity_id: impl Into<Uuid>,
        details: JsonValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityLogId::new(),
            shop_id: ctx.shop_id,
            user_id: ctx.user_id,
            action,
            entity_id: Some(entity_id.into()),
            details,
            created_at: now,
        }
    }
}

impl Entity for ActivityLog {
    type Id = ActivityLogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    OutOfStock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub shop_id: ShopId,
    pub kind: NotificationKind,
    pub product_id: Option<ProductId>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Alert for a product whose stock just dropped to low or zero.
    pub fn for_stock_change(change: &StockChange, now: DateTime<Utc>) -> Option<Self> {
        let product = &change.product;
        let (kind, message) = match change.dropped_to()? {
            StockLevel::Low => (
                NotificationKind::LowStock,
                format!(
                    "{} is running low ({} left, threshold {})",
                    product.name(),
                    product.stock(),
                    product.low_stock_threshold()
                ),
            ),
            StockLevel::Out => (
                NotificationKind::OutOfStock,
                format!("{} is out of stock", product.name()),
            ),
            StockLevel::InStock => return None,
        };

        Some(Self {
            id: NotificationId::new(),
            shop_id: product.shop_id(),
            kind,
            product_id: Some(*product.id()),
            message,
            read: false,
            created_at: now,
        })
    }
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
