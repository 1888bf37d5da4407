use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopkeep_core::{
    AggregateRoot, CategoryId, DomainError, Entity, ExpectedVersion, NotificationId, ProductId,
    SaleId, ShopId,
};
use shopkeep_inventory::StockMovement;
use shopkeep_products::{Category, Product};
use shopkeep_sales::Sale;

use super::{
    ActivityLogRepository, CategoryRepository, NotificationRepository, ProductRepository,
    RepoResult, RepositoryError, SaleRepository, StockChange, StockLedger,
};
use crate::records::{ActivityLog, Notification};

/// Rows of one table, partitioned by shop, in insertion order.
#[derive(Debug)]
struct ShopTable<V> {
    rows: HashMap<ShopId, Vec<V>>,
}

impl<V> Default for ShopTable<V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<V> ShopTable<V>
where
    V: Entity + Clone,
{
    fn get(&self, shop_id: ShopId, id: &V::Id) -> Option<&V> {
        self.rows.get(&shop_id)?.iter().find(|v| v.id() == id)
    }

    fn get_mut(&mut self, shop_id: ShopId, id: &V::Id) -> Option<&mut V> {
        self.rows.get_mut(&shop_id)?.iter_mut().find(|v| v.id() == id)
    }

    fn iter(&self, shop_id: ShopId) -> impl Iterator<Item = &V> {
        self.rows.get(&shop_id).into_iter().flatten()
    }

    fn list(&self, shop_id: ShopId) -> Vec<V> {
        self.iter(shop_id).cloned().collect()
    }

    /// Append a row; `false` if the id is already taken in this shop.
    fn insert(&mut self, shop_id: ShopId, value: V) -> bool {
        if self.get(shop_id, value.id()).is_some() {
            return false;
        }
        self.rows.entry(shop_id).or_default().push(value);
        true
    }

    fn remove(&mut self, shop_id: ShopId, id: &V::Id) -> Option<V> {
        let rows = self.rows.get_mut(&shop_id)?;
        let idx = rows.iter().position(|v| v.id() == id)?;
        Some(rows.remove(idx))
    }
}

#[derive(Debug, Default)]
struct Tables {
    products: ShopTable<Product>,
    categories: ShopTable<Category>,
    movements: ShopTable<StockMovement>,
    sales: ShopTable<Sale>,
    activity: ShopTable<ActivityLog>,
    notifications: ShopTable<Notification>,
}

impl Tables {
    /// Stage every movement against a scratch copy of the affected products,
    /// then write back only if all of them succeed.
    fn apply_movements(
        &mut self,
        shop_id: ShopId,
        movements: &[StockMovement],
    ) -> RepoResult<Vec<StockChange>> {
        let mut staged: Vec<StockChange> = Vec::new();

        for movement in movements {
            if movement.shop_id != shop_id {
                return Err(DomainError::invariant("movement belongs to another shop").into());
            }

            let idx = match staged
                .iter()
                .position(|c| *c.product.id() == movement.product_id)
            {
                Some(idx) => idx,
                None => {
                    let product = self
                        .products
                        .get(shop_id, &movement.product_id)
                        .ok_or_else(|| RepositoryError::not_found("product", movement.product_id))?;
                    staged.push(StockChange {
                        previous_stock: product.stock(),
                        previous_level: product.stock_level(),
                        product: product.clone(),
                    });
                    staged.len() - 1
                }
            };

            let current = &staged[idx].product;
            if !movement.kind.increases_stock() && movement.quantity > current.stock() {
                return Err(RepositoryError::InsufficientStock {
                    product_id: movement.product_id,
                    requested: movement.quantity,
                    available: current.stock(),
                });
            }
            staged[idx].product = movement.apply(current)?;
        }

        for change in &staged {
            if let Some(stored) = self.products.get_mut(shop_id, change.product.id()) {
                *stored = change.product.clone();
            }
        }
        for movement in movements {
            self.movements.insert(shop_id, movement.clone());
        }

        Ok(staged)
    }
}

/// In-memory store implementing every repository trait.
///
/// Intended for tests/dev. A single `RwLock` guards all tables, so multi-table
/// writes (a sale plus its stock movements) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryShopStore {
    inner: RwLock<Tables>,
}

impl InMemoryShopStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(|_| RepositoryError::Poisoned)
    }
}

impl ProductRepository for InMemoryShopStore {
    fn get_product(&self, shop_id: ShopId, id: ProductId) -> RepoResult<Product> {
        self.read()?
            .products
            .get(shop_id, &id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("product", id))
    }

    fn list_products(&self, shop_id: ShopId) -> RepoResult<Vec<Product>> {
        Ok(self.read()?.products.list(shop_id))
    }

    fn insert_product(&self, product: Product) -> RepoResult<()> {
        let mut tables = self.write()?;
        let shop_id = product.shop_id();

        if let Some(sku) = product.sku() {
            if tables.products.iter(shop_id).any(|p| p.sku() == Some(sku)) {
                return Err(RepositoryError::Conflict(format!("sku {sku} already exists")));
            }
        }

        let id = *product.id();
        if !tables.products.insert(shop_id, product) {
            return Err(RepositoryError::Conflict(format!("product {id} already exists")));
        }
        Ok(())
    }

    fn update_product(&self, product: Product, expected: ExpectedVersion) -> RepoResult<()> {
        let mut tables = self.write()?;
        let shop_id = product.shop_id();
        let id = *product.id();

        if let Some(sku) = product.sku() {
            if tables
                .products
                .iter(shop_id)
                .any(|p| p.sku() == Some(sku) && *p.id() != id)
            {
                return Err(RepositoryError::Conflict(format!("sku {sku} already exists")));
            }
        }

        let stored = tables
            .products
            .get_mut(shop_id, &id)
            .ok_or_else(|| RepositoryError::not_found("product", id))?;
        expected.check(stored.version())?;
        *stored = product;
        Ok(())
    }

    fn remove_product(&self, shop_id: ShopId, id: ProductId) -> RepoResult<Product> {
        self.write()?
            .products
            .remove(shop_id, &id)
            .ok_or_else(|| RepositoryError::not_found("product", id))
    }
}

impl CategoryRepository for InMemoryShopStore {
    fn get_category(&self, shop_id: ShopId, id: CategoryId) -> RepoResult<Category> {
        self.read()?
            .categories
            .get(shop_id, &id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("category", id))
    }

    fn list_categories(&self, shop_id: ShopId) -> RepoResult<Vec<Category>> {
        Ok(self.read()?.categories.list(shop_id))
    }

    fn insert_category(&self, category: Category) -> RepoResult<()> {
        let mut tables = self.write()?;
        let shop_id = category.shop_id;

        if tables
            .categories
            .iter(shop_id)
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(RepositoryError::Conflict(format!(
                "category {} already exists",
                category.name
            )));
        }

        let id = category.id;
        if !tables.categories.insert(shop_id, category) {
            return Err(RepositoryError::Conflict(format!("category {id} already exists")));
        }
        Ok(())
    }

    fn remove_category(&self, shop_id: ShopId, id: CategoryId) -> RepoResult<Category> {
        let mut tables = self.write()?;

        let in_use = tables
            .products
            .iter(shop_id)
            .filter(|p| p.category_id() == Some(id))
            .count();
        if in_use > 0 {
            return Err(RepositoryError::InUse(format!(
                "category {id} is used by {in_use} product(s)"
            )));
        }

        tables
            .categories
            .remove(shop_id, &id)
            .ok_or_else(|| RepositoryError::not_found("category", id))
    }
}

impl StockLedger for InMemoryShopStore {
    fn apply_movements(
        &self,
        shop_id: ShopId,
        movements: &[StockMovement],
    ) -> RepoResult<Vec<StockChange>> {
        self.write()?.apply_movements(shop_id, movements)
    }

    fn movements(&self, shop_id: ShopId, product_id: ProductId) -> RepoResult<Vec<StockMovement>> {
        Ok(self
            .read()?
            .movements
            .iter(shop_id)
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }
}

impl SaleRepository for InMemoryShopStore {
    fn commit_sale(
        &self,
        sale: &Sale,
        movements: &[StockMovement],
    ) -> RepoResult<Vec<StockChange>> {
        let mut tables = self.write()?;
        let shop_id = sale.shop_id;

        if tables.sales.get(shop_id, &sale.id).is_some() {
            return Err(RepositoryError::Conflict(format!("sale {} already exists", sale.id)));
        }

        for item in &sale.items {
            let product = tables
                .products
                .get(shop_id, &item.product_id)
                .ok_or_else(|| RepositoryError::not_found("product", item.product_id))?;
            if !product.can_be_sold() {
                return Err(DomainError::invariant(format!(
                    "{} is no longer available for sale",
                    product.name()
                ))
                .into());
            }
        }

        let changes = tables.apply_movements(shop_id, movements)?;
        tables.sales.insert(shop_id, sale.clone());
        Ok(changes)
    }

    fn get_sale(&self, shop_id: ShopId, id: SaleId) -> RepoResult<Sale> {
        self.read()?
            .sales
            .get(shop_id, &id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("sale", id))
    }

    fn list_sales(&self, shop_id: ShopId) -> RepoResult<Vec<Sale>> {
        Ok(self.read()?.sales.list(shop_id))
    }
}

impl ActivityLogRepository for InMemoryShopStore {
    fn append_activity(&self, entry: ActivityLog) -> RepoResult<()> {
        let shop_id = entry.shop_id;
        self.write()?.activity.insert(shop_id, entry);
        Ok(())
    }

    fn list_activity(&self, shop_id: ShopId) -> RepoResult<Vec<ActivityLog>> {
        Ok(self.read()?.activity.list(shop_id))
    }
}

impl NotificationRepository for InMemoryShopStore {
    fn push_notification(&self, notification: Notification) -> RepoResult<()> {
        let shop_id = notification.shop_id;
        self.write()?.notifications.insert(shop_id, notification);
        Ok(())
    }

    fn list_notifications(&self, shop_id: ShopId) -> RepoResult<Vec<Notification>> {
        Ok(self.read()?.notifications.list(shop_id))
    }

    fn unread_notifications(&self, shop_id: ShopId) -> RepoResult<Vec<Notification>> {
        Ok(self
            .read()?
            .notifications
            .iter(shop_id)
            .filter(|n| !n.read)
            .cloned()
            .collect())
    }

    fn mark_read(&self, shop_id: ShopId, id: NotificationId) -> RepoResult<()> {
        let mut tables = self.write()?;
        let notification = tables
            .notifications
            .get_mut(shop_id, &id)
            .ok_or_else(|| RepositoryError::not_found("notification", id))?;
        notification.read = true;
        Ok(())
    }
}
