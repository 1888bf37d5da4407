//! Turning a cart into a committed sale.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use shopkeep_core::{MovementId, SaleId, SessionContext};
use shopkeep_inventory::{MovementKind, StockMovement};
use shopkeep_sales::{Cart, CartNotice, PaymentMethod, Sale};

use crate::records::{ActivityAction, ActivityLog, Notification};
use crate::repository::{
    ActivityLogRepository, NotificationRepository, RepoResult, RepositoryError, SaleRepository,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Something the cashier can fix at the counter (empty cart, bad discount).
    #[error(transparent)]
    Cart(#[from] CartNotice),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct CheckoutService<S> {
    store: Arc<S>,
}

impl<S> Clone for CheckoutService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> CheckoutService<S>
where
    S: SaleRepository + ActivityLogRepository + NotificationRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Commit the cart as a sale paid with `payment_method`.
    ///
    /// Stock is re-checked and decremented atomically with storing the sale.
    /// The cart is cleared only once the sale is stored; on any error it is
    /// returned to the caller exactly as it was.
    pub fn complete_sale(
        &self,
        ctx: &SessionContext,
        cart: &mut Cart,
        payment_method: PaymentMethod,
    ) -> Result<Sale, CheckoutError> {
        if cart.is_empty() {
            tracing::warn!(shop_id = %ctx.shop_id, user_id = %ctx.user_id, "checkout with empty cart");
            return Err(CartNotice::EmptyCart.into());
        }

        let now = Utc::now();
        let sale = Sale::from_cart(SaleId::new(), ctx, cart, payment_method, now)?;

        let movements = sale
            .items
            .iter()
            .map(|item| {
                StockMovement::new(
                    MovementId::new(),
                    ctx.shop_id,
                    item.product_id,
                    MovementKind::Sale,
                    item.quantity,
                    Some(format!("sale {}", sale.id)),
                    ctx.user_id,
                    now,
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        let changes = match self.store.commit_sale(&sale, &movements) {
            Ok(changes) => changes,
            Err(err) => {
                tracing::warn!(shop_id = %ctx.shop_id, sale_id = %sale.id, error = %err, "sale not committed");
                return Err(err.into());
            }
        };

        cart.clear();

        tracing::info!(
            shop_id = %ctx.shop_id,
            sale_id = %sale.id,
            user_id = %ctx.user_id,
            items = sale.items.len(),
            total = %sale.total,
            "sale completed"
        );

        let entry = ActivityLog::record(
            ctx,
            ActivityAction::SaleCompleted,
            sale.id,
            json!({
                "items": sale.unit_count(),
                "subtotal": sale.subtotal,
                "tax": sale.tax,
                "discount": sale.discount,
                "total": sale.total,
                "payment_method": sale.payment_method,
            }),
            now,
        );
        if let Err(err) = self.store.append_activity(entry) {
            tracing::error!(shop_id = %ctx.shop_id, sale_id = %sale.id, error = %err, "failed to record activity");
        }

        for notification in changes
            .iter()
            .filter_map(|change| Notification::for_stock_change(change, now))
        {
            tracing::warn!(shop_id = %ctx.shop_id, message = %notification.message, "stock alert");
            if let Err(err) = self.store.push_notification(notification) {
                tracing::error!(shop_id = %ctx.shop_id, error = %err, "failed to push notification");
            }
        }

        Ok(sale)
    }

    pub fn get_sale(&self, ctx: &SessionContext, id: SaleId) -> RepoResult<Sale> {
        self.store.get_sale(ctx.shop_id, id)
    }

    /// Sales of the acting shop, oldest first.
    pub fn list_sales(&self, ctx: &SessionContext) -> RepoResult<Vec<Sale>> {
        self.store.list_sales(ctx.shop_id)
    }
}
