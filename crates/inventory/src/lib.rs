//! Inventory domain module: stock movements.
//!
//! Every change to a product's stock is expressed as a [`StockMovement`]
//! (restock, removal, wastage or sale) so the history of a product's stock
//! can be listed and audited. Pure domain logic (no IO, no storage).

pub mod movement;

pub use movement::{MovementKind, StockMovement};
