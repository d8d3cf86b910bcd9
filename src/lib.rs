//! Prepared-statement core for SQL drivers.
//!
//! A [`Template`] records the `?` or `:name` placeholders in a SQL string, a
//! [`ParameterBinder`] holds values bound to them (snapshotted with
//! `bind_value` or read live from a [`ParamCell`] with `bind_param`), and a
//! [`PreparedStatement`] resolves those bindings into the flat value list a
//! [`Driver`] executes. Rows come back through a forward-only [`ResultSet`]
//! that materializes each row in one of four [`FetchStyle`] shapes.
//!
//! ```rust
//! # #[cfg(feature = "sqlite")] {
//! use sql_stmt::prelude::*;
//!
//! let conn = Connection::new(SqliteDriver::open_in_memory()?);
//! conn.driver().execute_batch(
//!     "CREATE TABLE users (name TEXT, email TEXT);
//!      INSERT INTO users VALUES ('John', 'j@x.com');",
//! )?;
//!
//! let mut stmt = conn.prepare("SELECT name, email FROM users WHERE name = ?")?;
//! stmt.execute_with(&["John".into()])?;
//! let row = stmt.fetch(FetchStyle::Positional)?;
//! assert_eq!(
//!     row,
//!     Some(FetchedRow::Positional(vec!["John".into(), "j@x.com".into()]))
//! );
//! # }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binder;
pub mod config;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod template;
pub mod translation;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use binder::{BindMode, Binding, ParamRef, ParameterBinder};
pub use config::{StatementOptions, UnknownPlaceholderPolicy};
pub use driver::{Driver, DriverError};
pub use error::{BindingError, ParseError, StmtError};
pub use results::{FetchedRow, KeyedRow, ResultSet, Row, RowKey, RowObject};
pub use statement::{Connection, PreparedStatement};
pub use template::{PlaceholderRef, PlaceholderStyle, Template};
pub use translation::Dialect;
pub use types::{FetchStyle, ParamCell, ParamType, TypedValue};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
