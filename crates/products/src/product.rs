use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkeep_core::{
    AggregateRoot, CategoryId, DomainError, DomainResult, Entity, Money, ProductId, ShopId,
};

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

/// Stock level relative to the product's low-stock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    InStock,
    Low,
    Out,
}

impl StockLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::InStock => "in_stock",
            StockLevel::Low => "low_stock",
            StockLevel::Out => "out_of_stock",
        }
    }
}

/// Form input for a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Money,
    pub cost_price: Option<Money>,
    pub stock: u32,
    pub low_stock_threshold: u32,
}

/// Partial edit of an existing product. `None` leaves a field untouched.
///
/// Stock is deliberately absent: it only changes through stock movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price: Option<Money>,
    pub cost_price: Option<Money>,
    pub low_stock_threshold: Option<u32>,
}

impl ProductEdit {
    fn is_empty(&self) -> bool {
        self == &ProductEdit::default()
    }
}

/// Aggregate root: Product (row of the `products` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    shop_id: ShopId,
    category_id: Option<CategoryId>,
    sku: Option<String>,
    name: String,
    description: Option<String>,
    price: Money,
    cost_price: Option<Money>,
    stock: u32,
    low_stock_threshold: u32,
    status: ProductStatus,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate a product form and build the product at version 1.
    pub fn create(
        id: ProductId,
        shop_id: ShopId,
        form: NewProduct,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = required_name(&form.name)?;
        validate_price(form.price)?;
        if let Some(cost) = form.cost_price {
            validate_cost(cost)?;
        }

        Ok(Self {
            id,
            shop_id,
            category_id: form.category_id,
            sku: optional_text(form.sku),
            name,
            description: optional_text(form.description),
            price: form.price,
            cost_price: form.cost_price,
            stock: form.stock,
            low_stock_threshold: form.low_stock_threshold,
            status: ProductStatus::Active,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn shop_id(&self) -> ShopId {
        self.shop_id
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn cost_price(&self) -> Option<Money> {
        self.cost_price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stock strictly below the configured threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.low_stock_threshold
    }

    pub fn stock_level(&self) -> StockLevel {
        if self.stock == 0 {
            StockLevel::Out
        } else if self.is_low_stock() {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// Check if product can be sold (must be Active, not Archived).
    pub fn can_be_sold(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Apply a partial edit. Validation happens before any field changes.
    pub fn edit(&mut self, edit: ProductEdit, now: DateTime<Utc>) -> DomainResult<()> {
        if edit.is_empty() {
            return Err(DomainError::validation("no changes supplied"));
        }

        let name = edit.name.as_deref().map(required_name).transpose()?;
        if let Some(price) = edit.price {
            validate_price(price)?;
        }
        if let Some(cost) = edit.cost_price {
            validate_cost(cost)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if edit.sku.is_some() {
            self.sku = optional_text(edit.sku);
        }
        if edit.description.is_some() {
            self.description = optional_text(edit.description);
        }
        if let Some(category_id) = edit.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(price) = edit.price {
            self.price = price;
        }
        if let Some(cost) = edit.cost_price {
            self.cost_price = Some(cost);
        }
        if let Some(threshold) = edit.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }

        self.touch(now);
        Ok(())
    }

    pub fn archive(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == ProductStatus::Archived {
            return Err(DomainError::conflict("product is already archived"));
        }
        self.status = ProductStatus::Archived;
        self.touch(now);
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == ProductStatus::Active {
            return Err(DomainError::conflict("product is already active"));
        }
        self.status = ProductStatus::Active;
        self.touch(now);
        Ok(())
    }

    /// Add units to stock.
    pub fn receive_stock(&mut self, quantity: u32, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        self.touch(now);
        Ok(())
    }

    /// Take units out of stock. Stock never goes negative.
    pub fn withdraw_stock(&mut self, quantity: u32, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if quantity > self.stock {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available: self.stock,
            });
        }
        self.stock -= quantity;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Product {
    fn version(&self) -> u64 {
        self.version
    }
}

fn required_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("product name is required"));
    }
    Ok(name.to_string())
}

/// Highest accepted unit or cost price, in cents (one billion).
///
/// Keeps `price × stock` summed over any realistic cart far inside decimal range.
pub const MAX_PRICE_MINOR: i64 = 100_000_000_000;

fn validate_price(price: Money) -> DomainResult<()> {
    if price.is_negative() || price.is_zero() {
        return Err(DomainError::validation("price must be positive"));
    }
    check_price_ceiling(price)
}

fn validate_cost(cost: Money) -> DomainResult<()> {
    if cost.is_negative() {
        return Err(DomainError::validation("cost price cannot be negative"));
    }
    check_price_ceiling(cost)
}

fn check_price_ceiling(price: Money) -> DomainResult<()> {
    let max = Money::from_minor(MAX_PRICE_MINOR);
    if price > max {
        return Err(DomainError::validation(format!("price cannot exceed {max}")));
    }
    Ok(())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form() -> NewProduct {
        NewProduct {
            name: "Phone Case".to_string(),
            sku: Some("CASE-01".to_string()),
            description: None,
            category_id: None,
            price: Money::new(dec!(45.50)),
            cost_price: Some(Money::new(dec!(20))),
            stock: 12,
            low_stock_threshold: 5,
        }
    }

    fn product() -> Product {
        Product::create(ProductId::new(), ShopId::new(), form(), Utc::now()).unwrap()
    }

    #[test]
    fn create_starts_active_at_version_one() {
        let p = product();
        assert_eq!(p.status(), ProductStatus::Active);
        assert_eq!(p.version(), 1);
        assert_eq!(p.stock(), 12);
        assert!(p.can_be_sold());
    }

    #[test]
    fn create_rejects_missing_name() {
        let mut f = form();
        f.name = "   ".to_string();
        let err = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("name")),
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_rejects_non_positive_price() {
        let mut f = form();
        f.price = Money::ZERO;
        assert!(Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).is_err());
    }

    #[test]
    fn prices_above_the_ceiling_are_rejected() {
        let mut f = form();
        f.price = Money::new(rust_decimal::Decimal::MAX);
        let err = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut f = form();
        f.price = Money::from_minor(MAX_PRICE_MINOR);
        let mut p = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap();

        let edit = ProductEdit {
            cost_price: Some(Money::from_minor(MAX_PRICE_MINOR + 1)),
            ..ProductEdit::default()
        };
        assert!(p.edit(edit, Utc::now()).is_err());
    }

    #[test]
    fn blank_sku_is_stored_as_none() {
        let mut f = form();
        f.sku = Some("  ".to_string());
        let p = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap();
        assert_eq!(p.sku(), None);
    }

    #[test]
    fn stock_level_follows_threshold() {
        let mut p = product();
        assert_eq!(p.stock_level(), StockLevel::InStock);

        p.withdraw_stock(8, Utc::now()).unwrap();
        assert_eq!(p.stock(), 4);
        assert!(p.is_low_stock());
        assert_eq!(p.stock_level(), StockLevel::Low);

        p.withdraw_stock(4, Utc::now()).unwrap();
        assert_eq!(p.stock_level(), StockLevel::Out);
    }

    #[test]
    fn stock_equal_to_threshold_is_not_low() {
        let mut p = product();
        p.withdraw_stock(7, Utc::now()).unwrap();
        assert_eq!(p.stock(), 5);
        assert!(!p.is_low_stock());
    }

    #[test]
    fn withdraw_beyond_stock_is_rejected_without_change() {
        let mut p = product();
        let err = p.withdraw_stock(13, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 13,
                available: 12
            }
        );
        assert_eq!(p.stock(), 12);
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn zero_quantity_movements_are_rejected() {
        let mut p = product();
        assert!(p.receive_stock(0, Utc::now()).is_err());
        assert!(p.withdraw_stock(0, Utc::now()).is_err());
    }

    #[test]
    fn edit_validates_before_mutating() {
        let mut p = product();
        let err = p
            .edit(
                ProductEdit {
                    name: Some("New name".to_string()),
                    price: Some(Money::new(dec!(-1))),
                    ..ProductEdit::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(p.name(), "Phone Case");
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn edit_applies_changes_and_bumps_version() {
        let mut p = product();
        p.edit(
            ProductEdit {
                price: Some(Money::new(dec!(49.99))),
                low_stock_threshold: Some(20),
                ..ProductEdit::default()
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(p.price(), Money::new(dec!(49.99)));
        assert!(p.is_low_stock());
        assert_eq!(p.version(), 2);
    }

    #[test]
    fn empty_edit_is_rejected() {
        let mut p = product();
        assert!(p.edit(ProductEdit::default(), Utc::now()).is_err());
    }

    #[test]
    fn archive_then_activate() {
        let mut p = product();
        p.archive(Utc::now()).unwrap();
        assert!(!p.can_be_sold());
        assert!(matches!(
            p.archive(Utc::now()),
            Err(DomainError::Conflict(_))
        ));
        p.activate(Utc::now()).unwrap();
        assert!(p.can_be_sold());
        assert_eq!(p.version(), 3);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["low_stock_threshold"], 5);
        assert_eq!(json["price"], "45.50");
        assert_eq!(json["status"], "active");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: receiving then withdrawing the same quantity restores stock.
            #[test]
            fn receive_then_withdraw_restores_stock(start in 0u32..10_000, qty in 1u32..10_000) {
                let mut f = form();
                f.stock = start;
                let mut p = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap();

                p.receive_stock(qty, Utc::now()).unwrap();
                p.withdraw_stock(qty, Utc::now()).unwrap();

                prop_assert_eq!(p.stock(), start);
                prop_assert_eq!(p.version(), 3);
            }

            /// Property: a withdrawal either succeeds exactly or leaves stock untouched.
            #[test]
            fn withdraw_never_underflows(start in 0u32..100, qty in 1u32..200) {
                let mut f = form();
                f.stock = start;
                let mut p = Product::create(ProductId::new(), ShopId::new(), f, Utc::now()).unwrap();

                match p.withdraw_stock(qty, Utc::now()) {
                    Ok(()) => prop_assert_eq!(p.stock(), start - qty),
                    Err(_) => {
                        prop_assert!(qty > start);
                        prop_assert_eq!(p.stock(), start);
                    }
                }
            }
        }
    }
}
