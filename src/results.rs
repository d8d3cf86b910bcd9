pub mod fetch;
pub mod result_set;
pub mod row;

pub use fetch::{FetchedRow, KeyedRow, RowKey, RowObject};
pub use result_set::ResultSet;
pub use row::Row;
