//! Typed column descriptors.

use core::fmt;

/// How a column can be filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// Not filterable.
    None,
    /// Case-insensitive substring match.
    Text,
    /// Exact match against one of the listed options.
    Select(Vec<String>),
}

type Accessor<Row> = Box<dyn Fn(&Row) -> String + Send + Sync>;

/// A column of a [`crate::Table`]: a key, a label, and how to read the
/// cell value out of a row.
pub struct Column<Row> {
    key: &'static str,
    label: String,
    accessor: Accessor<Row>,
    filter: FilterKind,
}

impl<Row> Column<Row> {
    pub fn new(
        key: &'static str,
        label: impl Into<String>,
        accessor: impl Fn(&Row) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            label: label.into(),
            accessor: Box::new(accessor),
            filter: FilterKind::None,
        }
    }

    /// Make the column filterable by free text.
    pub fn text_filter(mut self) -> Self {
        self.filter = FilterKind::Text;
        self
    }

    /// Make the column filterable by one of `options`.
    pub fn select_filter<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = FilterKind::Select(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn filter(&self) -> &FilterKind {
        &self.filter
    }

    /// Cell value for `row`.
    pub fn value(&self, row: &Row) -> String {
        (self.accessor)(row)
    }
}

impl<Row> fmt::Debug for Column<Row> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
