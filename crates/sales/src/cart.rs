//! In-progress sale: cart lines bounded by stock, plus a discount.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopkeep_core::{DomainError, DomainResult, Entity, Money, ProductId, TaxRate};
use shopkeep_products::Product;

use crate::totals::{PricedLine, SaleTotals, compute_totals};

/// User-facing cart warnings.
///
/// None of these are fatal: the cart is left exactly as it was and the
/// cashier is expected to correct the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartNotice {
    #[error("{name} is out of stock (only {stock} available)")]
    OutOfStock {
        product_id: ProductId,
        name: String,
        stock: u32,
    },

    #[error("{name} is not available for sale")]
    Unavailable { product_id: ProductId, name: String },

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("quantity {requested} must be between 1 and {max}")]
    QuantityOutOfRange {
        product_id: ProductId,
        requested: u32,
        max: u32,
    },

    #[error("invalid discount: {0}")]
    InvalidDiscount(String),

    #[error("cart total is too large ({0})")]
    TotalOutOfRange(String),

    #[error("cart is empty")]
    EmptyCart,
}

/// One product entry in an in-progress sale.
///
/// Invariant: `1 <= quantity <= stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// Stock on hand when the product was added; the quantity ceiling.
    pub stock: u32,
    pub low_stock: bool,
}

impl PricedLine for CartLine {
    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Cart of an in-progress sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    tax_rate: TaxRate,
    lines: Vec<CartLine>,
    discount: Money,
}

impl Cart {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            tax_rate,
            lines: Vec::new(),
            discount: Money::ZERO,
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line grows by one only while it stays within stock; a new
    /// line starts at quantity 1 and records whether the product is low on stock.
    pub fn add_item(&mut self, product: &Product) -> Result<&CartLine, CartNotice> {
        let product_id = *product.id();

        if let Some(idx) = self.position(product_id) {
            let line = &mut self.lines[idx];
            if line.quantity >= line.stock {
                return Err(CartNotice::OutOfStock {
                    product_id,
                    name: line.name.clone(),
                    stock: line.stock,
                });
            }
            line.quantity += 1;
            return Ok(&self.lines[idx]);
        }

        if !product.can_be_sold() {
            return Err(CartNotice::Unavailable {
                product_id,
                name: product.name().to_string(),
            });
        }
        if product.stock() == 0 {
            return Err(CartNotice::OutOfStock {
                product_id,
                name: product.name().to_string(),
                stock: 0,
            });
        }

        self.lines.push(CartLine {
            product_id,
            name: product.name().to_string(),
            unit_price: product.price(),
            quantity: 1,
            stock: product.stock(),
            low_stock: product.is_low_stock(),
        });
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Set a line's quantity. Values outside `1..=stock` are rejected and the
    /// line keeps its previous quantity.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<&CartLine, CartNotice> {
        let idx = self
            .position(product_id)
            .ok_or(CartNotice::NotInCart(product_id))?;
        let line = &mut self.lines[idx];

        if quantity == 0 || quantity > line.stock {
            return Err(CartNotice::QuantityOutOfRange {
                product_id,
                requested: quantity,
                max: line.stock,
            });
        }

        line.quantity = quantity;
        self.drop_stale_discount();
        Ok(&self.lines[idx])
    }

    /// Drop a line. Removing a product that is not in the cart is a no-op.
    ///
    /// A discount that no longer fits the smaller total is reset to zero.
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<CartLine> {
        let idx = self.position(product_id)?;
        let removed = self.lines.remove(idx);
        self.drop_stale_discount();
        Some(removed)
    }

    /// Set the discount applied after tax.
    ///
    /// Rejected when negative or larger than the current `subtotal + tax`;
    /// the previous discount stays in place.
    pub fn set_discount(&mut self, discount: Money) -> Result<SaleTotals, CartNotice> {
        let totals =
            compute_totals(&self.lines, self.tax_rate, discount).map_err(totals_notice)?;
        self.discount = discount;
        Ok(totals)
    }

    /// Current totals with the cart's tax rate and discount.
    ///
    /// The discount always fits the current lines, so this fails only when
    /// the amounts are too large to represent.
    pub fn totals(&self) -> DomainResult<SaleTotals> {
        compute_totals(&self.lines, self.tax_rate, self.discount)
    }

    /// Empty the cart and reset the discount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = Money::ZERO;
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    // Invariant: discount <= subtotal + tax after every line change.
    fn drop_stale_discount(&mut self) {
        if self.discount.is_zero() {
            return;
        }
        let fits = compute_totals(&self.lines, self.tax_rate, Money::ZERO)
            .map(|totals| self.discount <= totals.gross())
            .unwrap_or(false);
        if !fits {
            self.discount = Money::ZERO;
        }
    }
}

/// Translate a totals failure into the notice shown at the counter.
pub(crate) fn totals_notice(err: DomainError) -> CartNotice {
    match err {
        DomainError::AmountOutOfRange(what) => CartNotice::TotalOutOfRange(what),
        other => CartNotice::InvalidDiscount(other.to_string()),
    }
}
