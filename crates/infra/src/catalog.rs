//! Product and category management.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use shopkeep_core::{
    AggregateRoot, CategoryId, Entity, ExpectedVersion, ProductId, SessionContext,
};
use shopkeep_products::{Category, NewCategory, NewProduct, Product, ProductEdit};

use crate::records::{ActivityAction, ActivityLog};
use crate::repository::{
    ActivityLogRepository, CategoryRepository, ProductRepository, RepoResult,
};

/// Catalog use cases. Every successful mutation leaves an activity log entry.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> CatalogService<S>
where
    S: ProductRepository + CategoryRepository + ActivityLogRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_category(&self, ctx: &SessionContext, form: NewCategory) -> RepoResult<Category> {
        let category = Category::create(CategoryId::new(), ctx.shop_id, form, Utc::now())?;
        self.store.insert_category(category.clone())?;

        tracing::info!(shop_id = %ctx.shop_id, category_id = %category.id, "category created");
        self.audit(
            ctx,
            ActivityAction::CategoryCreated,
            category.id,
            json!({ "name": category.name }),
        );
        Ok(category)
    }

    pub fn list_categories(&self, ctx: &SessionContext) -> RepoResult<Vec<Category>> {
        self.store.list_categories(ctx.shop_id)
    }

    pub fn remove_category(&self, ctx: &SessionContext, id: CategoryId) -> RepoResult<Category> {
        let removed = self.store.remove_category(ctx.shop_id, id)?;

        tracing::info!(shop_id = %ctx.shop_id, category_id = %id, "category removed");
        self.audit(
            ctx,
            ActivityAction::CategoryRemoved,
            id,
            json!({ "name": removed.name }),
        );
        Ok(removed)
    }

    pub fn create_product(&self, ctx: &SessionContext, form: NewProduct) -> RepoResult<Product> {
        if let Some(category_id) = form.category_id {
            self.store.get_category(ctx.shop_id, category_id)?;
        }

        let product = Product::create(ProductId::new(), ctx.shop_id, form, Utc::now())?;
        self.store.insert_product(product.clone())?;

        tracing::info!(shop_id = %ctx.shop_id, product_id = %product.id(), "product created");
        self.audit(
            ctx,
            ActivityAction::ProductCreated,
            *product.id(),
            json!({
                "name": product.name(),
                "sku": product.sku(),
                "price": product.price(),
                "stock": product.stock(),
            }),
        );
        Ok(product)
    }

    /// Apply `edit` to the stored product.
    ///
    /// `expected` is the version the editor started from; a concurrent edit
    /// in between yields a conflict instead of a lost update.
    pub fn edit_product(
        &self,
        ctx: &SessionContext,
        id: ProductId,
        edit: ProductEdit,
        expected: ExpectedVersion,
    ) -> RepoResult<Product> {
        if let Some(category_id) = edit.category_id {
            self.store.get_category(ctx.shop_id, category_id)?;
        }

        let mut product = self.store.get_product(ctx.shop_id, id)?;
        expected.check(product.version())?;
        let details = audit_details(&edit);
        product.edit(edit, Utc::now())?;
        self.store.update_product(product.clone(), expected)?;

        tracing::info!(
            shop_id = %ctx.shop_id,
            product_id = %id,
            version = product.version(),
            "product updated"
        );
        self.audit(ctx, ActivityAction::ProductUpdated, id, details);
        Ok(product)
    }

    pub fn archive_product(
        &self,
        ctx: &SessionContext,
        id: ProductId,
        expected: ExpectedVersion,
    ) -> RepoResult<Product> {
        let mut product = self.store.get_product(ctx.shop_id, id)?;
        expected.check(product.version())?;
        product.archive(Utc::now())?;
        self.store.update_product(product.clone(), expected)?;

        tracing::info!(shop_id = %ctx.shop_id, product_id = %id, "product archived");
        self.audit(
            ctx,
            ActivityAction::ProductArchived,
            id,
            json!({ "name": product.name() }),
        );
        Ok(product)
    }

    pub fn activate_product(
        &self,
        ctx: &SessionContext,
        id: ProductId,
        expected: ExpectedVersion,
    ) -> RepoResult<Product> {
        let mut product = self.store.get_product(ctx.shop_id, id)?;
        expected.check(product.version())?;
        product.activate(Utc::now())?;
        self.store.update_product(product.clone(), expected)?;

        tracing::info!(shop_id = %ctx.shop_id, product_id = %id, "product activated");
        self.audit(
            ctx,
            ActivityAction::ProductActivated,
            id,
            json!({ "name": product.name() }),
        );
        Ok(product)
    }

    pub fn remove_product(&self, ctx: &SessionContext, id: ProductId) -> RepoResult<Product> {
        let removed = self.store.remove_product(ctx.shop_id, id)?;

        tracing::info!(shop_id = %ctx.shop_id, product_id = %id, "product removed");
        self.audit(
            ctx,
            ActivityAction::ProductRemoved,
            id,
            json!({ "name": removed.name(), "sku": removed.sku() }),
        );
        Ok(removed)
    }

    pub fn get_product(&self, ctx: &SessionContext, id: ProductId) -> RepoResult<Product> {
        self.store.get_product(ctx.shop_id, id)
    }

    pub fn list_products(&self, ctx: &SessionContext) -> RepoResult<Vec<Product>> {
        self.store.list_products(ctx.shop_id)
    }

    // The mutation is already stored; a lost audit entry is logged, not returned.
    fn audit(
        &self,
        ctx: &SessionContext,
        action: ActivityAction,
        entity_id: impl Into<uuid::Uuid>,
        details: JsonValue,
    ) {
        let entry = ActivityLog::record(ctx, action, entity_id, details, Utc::now());
        if let Err(err) = self.store.append_activity(entry) {
            tracing::error!(shop_id = %ctx.shop_id, ?action, error = %err, "failed to record activity");
        }
    }
}

/// Serialize `value` for an audit entry. A value that cannot be serialized
/// is logged and recorded as `null`.
fn audit_details<T: Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "activity details not serializable");
        JsonValue::Null
    })
}
