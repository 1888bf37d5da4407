//! Point-of-sale domain module: cart, totals and committed sales.
//!
//! This crate contains the sale-computation and cart-consistency rules,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod cart;
pub mod sale;
pub mod totals;

pub use cart::{Cart, CartLine, CartNotice};
pub use sale::{PaymentMethod, Sale, SaleItem};
pub use totals::{PricedLine, SaleTotals, compute_totals};
