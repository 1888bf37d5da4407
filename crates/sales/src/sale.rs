//! Committed sales (rows of the `sales` and `sale_items` tables).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkeep_core::{Entity, Money, ProductId, SaleId, SaleItemId, SessionContext, ShopId, UserId};

use crate::cart::{Cart, CartNotice, totals_notice};
use crate::totals::{PricedLine, SaleTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::MobileMoney,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
        }
    }
}

/// One sold product within a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: SaleItemId,
    pub sale_id: SaleId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

impl PricedLine for SaleItem {
    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A committed sale. Totals are exact; round them for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub items: Vec<SaleItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Snapshot a cart into a sale record.
    ///
    /// The cart itself is not modified; the caller clears it once the sale
    /// has been committed.
    pub fn from_cart(
        id: SaleId,
        ctx: &SessionContext,
        cart: &Cart,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Sale, CartNotice> {
        if cart.is_empty() {
            return Err(CartNotice::EmptyCart);
        }

        let totals = cart
            .totals()
            .map_err(totals_notice)?;

        let items = cart
            .lines()
            .iter()
            .map(|line| SaleItem {
                id: SaleItemId::new(),
                sale_id: id,
                product_id: line.product_id,
                product_name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                total: line.line_total(),
            })
            .collect();

        Ok(Sale {
            id,
            shop_id: ctx.shop_id,
            user_id: ctx.user_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            payment_method,
            created_at: now,
        })
    }

    pub fn totals(&self) -> SaleTotals {
        SaleTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            discount: self.discount,
            total: self.total,
        }
    }

    /// Total number of units sold.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
