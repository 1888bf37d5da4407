use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkeep_core::{DomainError, DomainResult, Entity, MovementId, ProductId, ShopId, UserId};
use shopkeep_products::Product;

/// What kind of stock change a movement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received (manual "add stock").
    Restock,
    /// Goods taken out for reasons other than sale or damage.
    Removal,
    /// Damaged, expired or lost goods.
    Wastage,
    /// Goods leaving through a completed sale.
    Sale,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Restock => "restock",
            MovementKind::Removal => "removal",
            MovementKind::Wastage => "wastage",
            MovementKind::Sale => "sale",
        }
    }

    pub fn increases_stock(&self) -> bool {
        matches!(self, MovementKind::Restock)
    }
}

/// A single recorded change to one product's stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: u32,
    pub reason: Option<String>,
    pub recorded_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    /// Validated constructor.
    ///
    /// Quantity must be positive; wastage must say why stock was written off.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MovementId,
        shop_id: ShopId,
        product_id: ProductId,
        kind: MovementKind,
        quantity: u32,
        reason: Option<String>,
        recorded_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        if kind == MovementKind::Wastage && reason.is_none() {
            return Err(DomainError::validation("wastage requires a reason"));
        }

        Ok(Self {
            id,
            shop_id,
            product_id,
            kind,
            quantity,
            reason,
            recorded_by,
            occurred_at,
        })
    }

    /// Apply this movement to a copy of `product`.
    ///
    /// The input is left untouched so callers can apply a batch and discard
    /// every result if any single movement fails.
    pub fn apply(&self, product: &Product) -> DomainResult<Product> {
        if *product.id() != self.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        if product.shop_id() != self.shop_id {
            return Err(DomainError::invariant("shop mismatch"));
        }

        let mut next = product.clone();
        if self.kind.increases_stock() {
            next.receive_stock(self.quantity, self.occurred_at)?;
        } else {
            next.withdraw_stock(self.quantity, self.occurred_at)?;
        }
        Ok(next)
    }
}

impl Entity for StockMovement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_core::Money;
    use shopkeep_products::NewProduct;

    fn product(shop_id: ShopId, stock: u32) -> Product {
        Product::create(
            ProductId::new(),
            shop_id,
            NewProduct {
                name: "Charger".to_string(),
                sku: None,
                description: None,
                category_id: None,
                price: Money::new(dec!(19.99)),
                cost_price: None,
                stock,
                low_stock_threshold: 3,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn movement(p: &Product, kind: MovementKind, quantity: u32) -> DomainResult<StockMovement> {
        StockMovement::new(
            MovementId::new(),
            p.shop_id(),
            *p.id(),
            kind,
            quantity,
            Some("counted".to_string()),
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn restock_adds_and_others_subtract() {
        let p = product(ShopId::new(), 10);

        let added = movement(&p, MovementKind::Restock, 5).unwrap().apply(&p).unwrap();
        assert_eq!(added.stock(), 15);

        for kind in [MovementKind::Removal, MovementKind::Wastage, MovementKind::Sale] {
            let after = movement(&p, kind, 4).unwrap().apply(&p).unwrap();
            assert_eq!(after.stock(), 6, "{kind:?}");
        }
    }

    #[test]
    fn apply_leaves_input_untouched_on_failure() {
        let p = product(ShopId::new(), 2);
        let err = movement(&p, MovementKind::Removal, 3)
            .unwrap()
            .apply(&p)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(p.stock(), 2);
    }

    #[test]
    fn wastage_requires_reason() {
        let p = product(ShopId::new(), 2);
        let err = StockMovement::new(
            MovementId::new(),
            p.shop_id(),
            *p.id(),
            MovementKind::Wastage,
            1,
            Some("  ".to_string()),
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let p = product(ShopId::new(), 2);
        assert!(movement(&p, MovementKind::Restock, 0).is_err());
    }

    #[test]
    fn movement_for_other_product_is_rejected() {
        let shop = ShopId::new();
        let a = product(shop, 5);
        let b = product(shop, 5);
        let m = movement(&a, MovementKind::Removal, 1).unwrap();
        assert!(m.apply(&b).is_err());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&MovementKind::Wastage).unwrap();
        assert_eq!(json, "\"wastage\"");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: applying a movement never produces negative stock and
            /// changes stock by exactly the movement quantity when accepted.
            #[test]
            fn apply_changes_stock_by_quantity(start in 0u32..500, qty in 1u32..500, restock in any::<bool>()) {
                let p = product(ShopId::new(), start);
                let kind = if restock { MovementKind::Restock } else { MovementKind::Removal };
                let m = movement(&p, kind, qty).unwrap();

                match m.apply(&p) {
                    Ok(next) if restock => prop_assert_eq!(next.stock(), start + qty),
                    Ok(next) => prop_assert_eq!(next.stock(), start - qty),
                    Err(_) => prop_assert!(!restock && qty > start),
                }
            }
        }
    }
}
