//! Generic in-memory list screens: typed columns, per-column filters and
//! 1-based pagination.

pub mod column;
pub mod page;
pub mod table;

pub use column::{Column, FilterKind};
pub use page::{PageInfo, paginate, total_pages};
pub use table::{Table, TableError};
