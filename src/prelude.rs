//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::binder::ParamRef;
pub use crate::config::{StatementOptions, UnknownPlaceholderPolicy};
pub use crate::driver::{Driver, DriverError};
pub use crate::error::{BindingError, ParseError, StmtError};
pub use crate::results::{FetchedRow, ResultSet, Row, RowKey, RowObject};
pub use crate::statement::{Connection, PreparedStatement};
pub use crate::template::{PlaceholderStyle, Template};
pub use crate::translation::Dialect;
pub use crate::types::{FetchStyle, ParamCell, ParamType, TypedValue};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
