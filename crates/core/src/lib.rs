//! `shopkeep-core`: domain building blocks shared by every shop module.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod session;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ActivityLogId, CategoryId, MovementId, NotificationId, ProductId, SaleId, SaleItemId, ShopId,
    UserId,
};
pub use money::{Money, TaxRate};
pub use session::{Role, SessionContext};
