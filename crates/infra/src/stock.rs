//! Manual stock adjustments (restock, removal, wastage).

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use shopkeep_core::{DomainError, MovementId, ProductId, SessionContext};
use shopkeep_inventory::{MovementKind, StockMovement};

use crate::records::{ActivityAction, ActivityLog, Notification};
use crate::repository::{
    ActivityLogRepository, NotificationRepository, ProductRepository, RepoResult,
    RepositoryError, StockChange, StockLedger,
};

pub struct StockService<S> {
    store: Arc<S>,
}

impl<S> Clone for StockService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> StockService<S>
where
    S: ProductRepository + StockLedger + ActivityLogRepository + NotificationRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record one stock movement against a product and apply it.
    ///
    /// Sales are not accepted here; they leave stock through checkout.
    pub fn adjust(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
        kind: MovementKind,
        quantity: u32,
        reason: Option<String>,
    ) -> RepoResult<StockChange> {
        if kind == MovementKind::Sale {
            return Err(DomainError::validation("sale movements are recorded by checkout").into());
        }

        let now = Utc::now();
        let movement = StockMovement::new(
            MovementId::new(),
            ctx.shop_id,
            product_id,
            kind,
            quantity,
            reason,
            ctx.user_id,
            now,
        )?;

        let change = match self.store.apply_movements(ctx.shop_id, std::slice::from_ref(&movement)) {
            Ok(mut changes) => changes
                .pop()
                .ok_or_else(|| RepositoryError::not_found("product", product_id))?,
            Err(err @ RepositoryError::InsufficientStock { .. }) => {
                tracing::warn!(shop_id = %ctx.shop_id, %product_id, error = %err, "stock adjustment refused");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            shop_id = %ctx.shop_id,
            %product_id,
            kind = kind.as_str(),
            quantity,
            stock = change.product.stock(),
            "stock adjusted"
        );

        let entry = ActivityLog::record(
            ctx,
            ActivityAction::StockAdjusted,
            product_id,
            json!({
                "kind": kind,
                "quantity": quantity,
                "reason": movement.reason,
                "previous_stock": change.previous_stock,
                "stock": change.product.stock(),
            }),
            now,
        );
        if let Err(err) = self.store.append_activity(entry) {
            tracing::error!(shop_id = %ctx.shop_id, error = %err, "failed to record activity");
        }

        if let Some(notification) = Notification::for_stock_change(&change, now) {
            tracing::warn!(shop_id = %ctx.shop_id, %product_id, message = %notification.message, "stock alert");
            if let Err(err) = self.store.push_notification(notification) {
                tracing::error!(shop_id = %ctx.shop_id, error = %err, "failed to push notification");
            }
        }

        Ok(change)
    }

    /// Movement history of one product, oldest first.
    pub fn history(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
    ) -> RepoResult<Vec<StockMovement>> {
        self.store.get_product(ctx.shop_id, product_id)?;
        self.store.movements(ctx.shop_id, product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_core::{Entity, Money, Role, ShopId, UserId};
    use shopkeep_products::{NewProduct, Product};

    use crate::records::NotificationKind;
    use crate::repository::InMemoryShopStore;

    fn setup(stock: u32) -> (StockService<InMemoryShopStore>, Arc<InMemoryShopStore>, SessionContext, ProductId) {
        let store = Arc::new(InMemoryShopStore::new());
        let ctx = SessionContext::new(ShopId::new(), UserId::new(), Role::Admin);
        let product = Product::create(
            ProductId::new(),
            ctx.shop_id,
            NewProduct {
                name: "Screen protector".to_string(),
                sku: Some("SP-01".to_string()),
                description: None,
                category_id: None,
                price: Money::new(dec!(5)),
                cost_price: None,
                stock,
                low_stock_threshold: 5,
            },
            Utc::now(),
        )
        .unwrap();
        let id = *product.id();
        store.insert_product(product).unwrap();
        (StockService::new(Arc::clone(&store)), store, ctx, id)
    }

    #[test]
    fn restock_increases_stock_and_logs() {
        let (stock, store, ctx, id) = setup(2);
        let change = stock.adjust(&ctx, id, MovementKind::Restock, 10, None).unwrap();

        assert_eq!(change.previous_stock, 2);
        assert_eq!(change.product.stock(), 12);
        assert_eq!(store.get_product(ctx.shop_id, id).unwrap().stock(), 12);

        let log = store.list_activity(ctx.shop_id).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, ActivityAction::StockAdjusted);
        assert_eq!(log[0].details["stock"], 12);
        assert_eq!(stock.history(&ctx, id).unwrap().len(), 1);
    }

    #[test]
    fn removal_below_threshold_notifies_once() {
        let (stock, store, ctx, id) = setup(8);
        stock.adjust(&ctx, id, MovementKind::Removal, 4, None).unwrap();
        stock.adjust(&ctx, id, MovementKind::Removal, 1, None).unwrap();

        let notifications = store.list_notifications(ctx.shop_id).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::LowStock);
        assert_eq!(notifications[0].product_id, Some(id));
    }

    #[test]
    fn wastage_to_zero_raises_out_of_stock() {
        let (stock, store, ctx, id) = setup(3);
        stock
            .adjust(&ctx, id, MovementKind::Wastage, 3, Some("water damage".to_string()))
            .unwrap();

        let unread = store.unread_notifications(ctx.shop_id).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].kind, NotificationKind::OutOfStock);
    }

    #[test]
    fn insufficient_stock_changes_nothing() {
        let (stock, store, ctx, id) = setup(3);
        let err = stock
            .adjust(&ctx, id, MovementKind::Removal, 4, None)
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InsufficientStock { requested: 4, available: 3, .. }
        ));
        assert_eq!(store.get_product(ctx.shop_id, id).unwrap().stock(), 3);
        assert!(stock.history(&ctx, id).unwrap().is_empty());
        assert!(store.list_activity(ctx.shop_id).unwrap().is_empty());
    }

    #[test]
    fn invalid_adjustments_are_rejected() {
        let (stock, _, ctx, id) = setup(3);
        for (kind, qty, reason) in [
            (MovementKind::Sale, 1, None),
            (MovementKind::Restock, 0, None),
            (MovementKind::Wastage, 1, None),
        ] {
            let err = stock.adjust(&ctx, id, kind, qty, reason).unwrap_err();
            assert!(matches!(err, RepositoryError::Domain(DomainError::Validation(_))));
        }
    }

    #[test]
    fn unknown_product_is_not_found() {
        let (stock, _, ctx, _) = setup(3);
        let err = stock
            .adjust(&ctx, ProductId::new(), MovementKind::Restock, 1, None)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(stock.history(&ctx, ProductId::new()).is_err());
    }
}
