//! Shop-scoped storage boundary (repository pattern).
//!
//! Services only talk to these traits, so the in-memory store used in tests
//! and development can be swapped for a database-backed one without touching
//! any caller. Every call is scoped by a [`ShopId`].

pub mod in_memory;

use thiserror::Error;

use shopkeep_core::{
    CategoryId, DomainError, ExpectedVersion, NotificationId, ProductId, SaleId, ShopId,
};
use shopkeep_inventory::StockMovement;
use shopkeep_products::{Category, Product, StockLevel};
use shopkeep_sales::Sale;

use crate::records::{ActivityLog, Notification};

pub use in_memory::InMemoryShopStore;

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Duplicate key or stale version.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The record is still referenced by other records.
    #[error("in use: {0}")]
    InUse(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage lock poisoned")]
    Poisoned,
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result of applying stock movements to one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product: Product,
    pub previous_stock: u32,
    pub previous_level: StockLevel,
}

impl StockChange {
    /// The new level, if stock just fell into low or out-of-stock territory.
    pub fn dropped_to(&self) -> Option<StockLevel> {
        let level = self.product.stock_level();
        match level {
            StockLevel::InStock => None,
            _ if level == self.previous_level => None,
            _ => Some(level),
        }
    }
}

pub trait ProductRepository: Send + Sync {
    fn get_product(&self, shop_id: ShopId, id: ProductId) -> RepoResult<Product>;
    fn list_products(&self, shop_id: ShopId) -> RepoResult<Vec<Product>>;
    fn insert_product(&self, product: Product) -> RepoResult<()>;
    /// Replace a product if the stored version matches `expected`.
    fn update_product(&self, product: Product, expected: ExpectedVersion) -> RepoResult<()>;
    fn remove_product(&self, shop_id: ShopId, id: ProductId) -> RepoResult<Product>;
}

pub trait CategoryRepository: Send + Sync {
    fn get_category(&self, shop_id: ShopId, id: CategoryId) -> RepoResult<Category>;
    fn list_categories(&self, shop_id: ShopId) -> RepoResult<Vec<Category>>;
    fn insert_category(&self, category: Category) -> RepoResult<()>;
    /// Refused with [`RepositoryError::InUse`] while products reference it.
    fn remove_category(&self, shop_id: ShopId, id: CategoryId) -> RepoResult<Category>;
}

pub trait StockLedger: Send + Sync {
    /// Apply `movements` all-or-nothing and record them.
    fn apply_movements(
        &self,
        shop_id: ShopId,
        movements: &[StockMovement],
    ) -> RepoResult<Vec<StockChange>>;

    /// Movement history of one product, oldest first.
    fn movements(&self, shop_id: ShopId, product_id: ProductId) -> RepoResult<Vec<StockMovement>>;
}

pub trait SaleRepository: Send + Sync {
    /// Commit a sale in one atomic step: re-validate that every product is
    /// still for sale with enough stock, apply the sale movements and store
    /// the sale. Nothing is written if any check fails.
    fn commit_sale(&self, sale: &Sale, movements: &[StockMovement])
    -> RepoResult<Vec<StockChange>>;

    fn get_sale(&self, shop_id: ShopId, id: SaleId) -> RepoResult<Sale>;
    fn list_sales(&self, shop_id: ShopId) -> RepoResult<Vec<Sale>>;
}

pub trait ActivityLogRepository: Send + Sync {
    fn append_activity(&self, entry: ActivityLog) -> RepoResult<()>;
    fn list_activity(&self, shop_id: ShopId) -> RepoResult<Vec<ActivityLog>>;
}

pub trait NotificationRepository: Send + Sync {
    fn push_notification(&self, notification: Notification) -> RepoResult<()>;
    fn list_notifications(&self, shop_id: ShopId) -> RepoResult<Vec<Notification>>;
    fn unread_notifications(&self, shop_id: ShopId) -> RepoResult<Vec<Notification>>;
    fn mark_read(&self, shop_id: ShopId, id: NotificationId) -> RepoResult<()>;
}
