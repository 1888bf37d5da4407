//! Column sets for the product and sale list screens.

use shopkeep_products::{Product, ProductStatus, StockLevel};
use shopkeep_sales::{PaymentMethod, Sale};
use shopkeep_table::{Column, Table, TableError};

pub fn product_columns() -> Vec<Column<Product>> {
    vec![
        Column::new("name", "Name", |p: &Product| p.name().to_string()).text_filter(),
        Column::new("sku", "SKU", |p: &Product| p.sku().unwrap_or_default().to_string())
            .text_filter(),
        Column::new("price", "Price", |p: &Product| p.price().to_string()),
        Column::new("stock", "Stock", |p: &Product| p.stock().to_string()),
        Column::new("status", "Status", |p: &Product| p.status().as_str().to_string())
            .select_filter([ProductStatus::Active.as_str(), ProductStatus::Archived.as_str()]),
        Column::new("stock_level", "Stock level", |p: &Product| {
            p.stock_level().as_str().to_string()
        })
        .select_filter([
            StockLevel::InStock.as_str(),
            StockLevel::Low.as_str(),
            StockLevel::Out.as_str(),
        ]),
    ]
}

pub fn product_table(products: Vec<Product>, page_size: usize) -> Result<Table<Product>, TableError> {
    Table::new(product_columns(), products, page_size)
}

pub fn sale_columns() -> Vec<Column<Sale>> {
    vec![
        Column::new("date", "Date", |s: &Sale| s.created_at.format("%Y-%m-%d").to_string())
            .text_filter(),
        Column::new("items", "Items", |s: &Sale| s.unit_count().to_string()),
        Column::new("total", "Total", |s: &Sale| s.total.to_string()),
        Column::new("payment_method", "Payment", |s: &Sale| {
            s.payment_method.as_str().to_string()
        })
        .select_filter(PaymentMethod::ALL.iter().map(PaymentMethod::as_str)),
    ]
}

pub fn sale_table(sales: Vec<Sale>, page_size: usize) -> Result<Table<Sale>, TableError> {
    Table::new(sale_columns(), sales, page_size)
}
