//! `Table<Row>`: filter first, then paginate.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::column::{Column, FilterKind};
use crate::page::{PageInfo, paginate, total_pages};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column {0} is not filterable")]
    NotFilterable(String),

    #[error("'{value}' is not an option of column {column}")]
    InvalidOption { column: String, value: String },

    #[error("page size must be positive")]
    ZeroPageSize,
}

/// In-memory list with per-column filters and 1-based pagination.
///
/// Rows keep their insertion order. Changing a filter or the page size
/// returns to page 1.
#[derive(Debug)]
pub struct Table<Row> {
    columns: Vec<Column<Row>>,
    rows: Vec<Row>,
    filters: BTreeMap<&'static str, String>,
    page: usize,
    page_size: usize,
}

impl<Row> Table<Row> {
    pub fn new(
        columns: Vec<Column<Row>>,
        rows: Vec<Row>,
        page_size: usize,
    ) -> Result<Self, TableError> {
        if page_size == 0 {
            return Err(TableError::ZeroPageSize);
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.key() == column.key()) {
                return Err(TableError::DuplicateColumn(column.key().to_string()));
            }
        }

        Ok(Self {
            columns,
            rows,
            filters: BTreeMap::new(),
            page: 1,
            page_size,
        })
    }

    pub fn columns(&self) -> &[Column<Row>] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Active filter value of a column, if any.
    pub fn filter_value(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Replace the rows (e.g. after a reload). Filters are kept and the
    /// current page is clamped into range.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.page = self.page.min(self.total_pages().max(1));
    }

    /// Filter `key` by `value`. An empty (or blank) value removes the filter.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) -> Result<(), TableError> {
        let column = self
            .columns
            .iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))?;

        let value = value.into();
        match column.filter() {
            FilterKind::None => return Err(TableError::NotFilterable(key.to_string())),
            FilterKind::Select(options) => {
                if !value.trim().is_empty() && !options.iter().any(|o| *o == value) {
                    return Err(TableError::InvalidOption {
                        column: key.to_string(),
                        value,
                    });
                }
            }
            FilterKind::Text => {}
        }

        let column_key = column.key();
        if value.trim().is_empty() {
            self.filters.remove(column_key);
        } else {
            self.filters.insert(column_key, value);
        }
        self.page = 1;
        Ok(())
    }

    pub fn clear_filter(&mut self, key: &str) {
        if self.filters.remove(key).is_some() {
            self.page = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), TableError> {
        if page_size == 0 {
            return Err(TableError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    /// Move to `page`, clamped into `1..=total_pages`. Returns the page shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages().max(1));
        self.page
    }

    /// Rows matching every active filter, in insertion order.
    pub fn filtered(&self) -> Vec<&Row> {
        let active: Vec<(&Column<Row>, Needle<'_>)> = self
            .columns
            .iter()
            .filter_map(|c| {
                let value = self.filters.get(c.key())?;
                let needle = match c.filter() {
                    FilterKind::Text => Needle::Text(value.to_lowercase()),
                    FilterKind::Select(_) => Needle::Exact(value.as_str()),
                    FilterKind::None => return None,
                };
                Some((c, needle))
            })
            .collect();

        self.rows
            .iter()
            .filter(|row| active.iter().all(|(c, needle)| needle.matches(&c.value(row))))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), self.page_size)
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&Row> {
        let filtered = self.filtered();
        paginate(&filtered, self.page, self.page_size).to_vec()
    }

    pub fn page_info(&self) -> PageInfo {
        let total_items = self.filtered().len();
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages: total_pages(total_items, self.page_size),
        }
    }
}

enum Needle<'a> {
    Text(String),
    Exact(&'a str),
}

impl Needle<'_> {
    fn matches(&self, cell: &str) -> bool {
        match self {
            Needle::Text(lowered) => cell.to_lowercase().contains(lowered.as_str()),
            Needle::Exact(value) => cell == *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Client {
        name: String,
        city: String,
        kind: &'static str,
    }

    fn client(name: &str, city: &str, kind: &'static str) -> Client {
        Client {
            name: name.to_string(),
            city: city.to_string(),
            kind,
        }
    }

    fn columns() -> Vec<Column<Client>> {
        vec![
            Column::new("name", "Name", |c: &Client| c.name.clone()).text_filter(),
            Column::new("city", "City", |c: &Client| c.city.clone()),
            Column::new("kind", "Type", |c: &Client| c.kind.to_string())
                .select_filter(["retail", "wholesale"]),
        ]
    }

    fn table() -> Table<Client> {
        Table::new(
            columns(),
            vec![
                client("Alice Martin", "Lyon", "retail"),
                client("Bob Stone", "Paris", "wholesale"),
                client("alicia keys", "Paris", "wholesale"),
                client("Carol", "Nice", "retail"),
            ],
            10,
        )
        .unwrap()
    }

    #[test]
    fn forty_two_rows_page_five_has_two() {
        let rows: Vec<Client> = (0..42).map(|i| client(&format!("c{i}"), "X", "retail")).collect();
        let mut t = Table::new(columns(), rows, 10).unwrap();

        assert_eq!(t.total_pages(), 5);
        assert_eq!(t.set_page(5), 5);
        let page = t.page_rows();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "c40");
        assert_eq!(page[1].name, "c41");
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let mut t = table();
        t.set_filter("name", "ALIC").unwrap();
        let names: Vec<&str> = t.filtered().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alice Martin", "alicia keys"]);
    }

    #[test]
    fn select_filter_is_exact() {
        let mut t = table();
        t.set_filter("kind", "wholesale").unwrap();
        assert_eq!(t.filtered().len(), 2);

        let err = t.set_filter("kind", "whole").unwrap_err();
        assert!(matches!(err, TableError::InvalidOption { .. }));
        assert_eq!(t.filter_value("kind"), Some("wholesale"));
    }

    #[test]
    fn filters_combine() {
        let mut t = table();
        t.set_filter("kind", "wholesale").unwrap();
        t.set_filter("name", "bob").unwrap();
        let rows = t.filtered();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bob Stone");
    }

    #[test]
    fn empty_value_clears_filter() {
        let mut t = table();
        t.set_filter("name", "carol").unwrap();
        assert_eq!(t.filtered().len(), 1);
        t.set_filter("name", "  ").unwrap();
        assert_eq!(t.filtered().len(), 4);
        assert_eq!(t.filter_value("name"), None);
    }

    #[test]
    fn blank_value_clears_select_filter_too() {
        let mut t = table();
        t.set_filter("kind", "retail").unwrap();
        assert_eq!(t.filtered().len(), 2);

        t.set_filter("kind", "  ").unwrap();
        assert_eq!(t.filter_value("kind"), None);
        assert_eq!(t.filtered().len(), 4);
    }

    #[test]
    fn unknown_and_unfilterable_columns_are_errors() {
        let mut t = table();
        assert_eq!(
            t.set_filter("email", "x").unwrap_err(),
            TableError::UnknownColumn("email".to_string())
        );
        assert_eq!(
            t.set_filter("city", "Paris").unwrap_err(),
            TableError::NotFilterable("city".to_string())
        );
    }

    #[test]
    fn filter_and_page_size_changes_reset_page() {
        let rows: Vec<Client> = (0..30).map(|i| client(&format!("c{i}"), "X", "retail")).collect();
        let mut t = Table::new(columns(), rows, 10).unwrap();

        t.set_page(3);
        t.set_filter("name", "c").unwrap();
        assert_eq!(t.page(), 1);

        t.set_page(2);
        t.set_page_size(5).unwrap();
        assert_eq!(t.page(), 1);
        assert_eq!(t.total_pages(), 6);

        t.set_page(2);
        t.clear_filters();
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn page_is_clamped_into_range() {
        let mut t = table();
        assert_eq!(t.set_page(0), 1);
        assert_eq!(t.set_page(9), 1);

        t.set_filter("name", "nobody").unwrap();
        assert_eq!(t.total_pages(), 0);
        assert_eq!(t.set_page(3), 1);
        assert!(t.page_rows().is_empty());
    }

    #[test]
    fn set_rows_clamps_page() {
        let rows: Vec<Client> = (0..30).map(|i| client(&format!("c{i}"), "X", "retail")).collect();
        let mut t = Table::new(columns(), rows, 10).unwrap();
        t.set_page(3);

        t.set_rows(vec![client("only", "X", "retail")]);
        assert_eq!(t.page(), 1);
        assert_eq!(t.page_rows().len(), 1);
    }

    #[test]
    fn page_info_reports_navigation() {
        let rows: Vec<Client> = (0..25).map(|i| client(&format!("c{i}"), "X", "retail")).collect();
        let mut t = Table::new(columns(), rows, 10).unwrap();
        t.set_page(2);

        let info = t.page_info();
        assert_eq!(info.total_items, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_previous());
        assert!(info.has_next());
    }

    #[test]
    fn constructor_validates_columns_and_page_size() {
        assert_eq!(
            Table::<Client>::new(columns(), vec![], 0).unwrap_err(),
            TableError::ZeroPageSize
        );

        let mut cols = columns();
        cols.push(Column::new("name", "Again", |c: &Client| c.name.clone()));
        assert!(matches!(
            Table::new(cols, vec![], 10),
            Err(TableError::DuplicateColumn(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: filtered rows are exactly those whose name contains the
            /// needle (ignoring case), in original order, and the page count
            /// follows ceil(filtered / page_size).
            #[test]
            fn filter_then_paginate(
                names in prop::collection::vec("[a-cA-C]{1,6}", 0..80),
                needle in "[a-cA-C]{1,2}",
                page_size in 1usize..15
            ) {
                let rows: Vec<Client> = names.iter().map(|n| client(n, "X", "retail")).collect();
                let mut t = Table::new(columns(), rows.clone(), page_size).unwrap();
                t.set_filter("name", needle.clone()).unwrap();

                let expected: Vec<&Client> = rows
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle.to_lowercase()))
                    .collect();
                prop_assert_eq!(t.filtered(), expected.clone());
                prop_assert_eq!(t.total_pages(), expected.len().div_ceil(page_size));

                let last = t.total_pages();
                if last > 0 {
                    t.set_page(last);
                    let tail = expected.len() - (last - 1) * page_size;
                    prop_assert_eq!(t.page_rows().len(), tail);
                }
            }
        }
    }
}
