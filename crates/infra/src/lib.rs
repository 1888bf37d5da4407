//! Infrastructure layer: storage, configuration and the shop's use cases.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod listing;
pub mod records;
pub mod repository;
pub mod stock;


pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutService};
pub use config::{ConfigError, PosConfig};
pub use records::{ActivityAction, ActivityLog, Notification, NotificationKind};
pub use repository::{InMemoryShopStore, RepoResult, RepositoryError, StockChange};
pub use stock::StockService;
