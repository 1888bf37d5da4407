//! Catalog domain module: products and categories.
//!
//! This crate contains business rules for the shop catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod product;

pub use category::{Category, NewCategory};
pub use product::{MAX_PRICE_MINOR, NewProduct, Product, ProductEdit, ProductStatus, StockLevel};
