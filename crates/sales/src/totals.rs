//! Sale total computation.
//!
//! `subtotal = Σ(price × quantity)`, `tax = subtotal × rate`,
//! `total = subtotal + tax − discount`. All values are exact; use
//! [`SaleTotals::rounded`] for display.

use serde::{Deserialize, Serialize};

use shopkeep_core::{DomainError, DomainResult, Money, TaxRate};

/// Anything that contributes `unit_price × quantity` to a subtotal.
pub trait PricedLine {
    fn unit_price(&self) -> Money;
    fn quantity(&self) -> u32;

    fn line_total(&self) -> Money {
        self.unit_price().times(self.quantity())
    }
}

/// Derived totals of a cart or sale.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Subtotal plus tax, before the discount.
    pub fn gross(&self) -> Money {
        self.subtotal + self.tax
    }

    /// Every component rounded half-up to cents.
    ///
    /// Components are rounded independently, so the rounded parts may not
    /// add up to the rounded total by a cent.
    pub fn rounded(&self) -> SaleTotals {
        SaleTotals {
            subtotal: self.subtotal.rounded(),
            tax: self.tax.rounded(),
            discount: self.discount.rounded(),
            total: self.total.rounded(),
        }
    }
}

/// Compute totals for `lines`.
///
/// A negative discount, or one larger than `subtotal + tax`, is rejected so
/// a sale total can never go below zero. Amounts too large to represent are
/// [`DomainError::AmountOutOfRange`].
pub fn compute_totals<L: PricedLine>(
    lines: &[L],
    tax_rate: TaxRate,
    discount: Money,
) -> DomainResult<SaleTotals> {
    if discount.is_negative() {
        return Err(DomainError::validation("discount cannot be negative"));
    }

    let mut subtotal = Money::ZERO;
    for line in lines {
        subtotal = line
            .unit_price()
            .checked_times(line.quantity())
            .and_then(|line_total| subtotal.checked_add(line_total))
            .ok_or_else(|| DomainError::amount_out_of_range("subtotal"))?;
    }
    let tax = subtotal
        .checked_at_rate(tax_rate)
        .ok_or_else(|| DomainError::amount_out_of_range("tax"))?;
    let gross = subtotal
        .checked_add(tax)
        .ok_or_else(|| DomainError::amount_out_of_range("subtotal + tax"))?;

    if discount > gross {
        return Err(DomainError::invariant(format!(
            "discount {discount} exceeds sale total {gross}"
        )));
    }

    Ok(SaleTotals {
        subtotal,
        tax,
        discount,
        total: gross - discount,
    })
}
