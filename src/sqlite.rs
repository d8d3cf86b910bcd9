//! [`Driver`] implementation over a `rusqlite` connection.

use std::path::Path;
use std::sync::Arc;

use rusqlite::types::{Value, ValueRef};

use crate::driver::{Driver, DriverError};
use crate::results::Row;
use crate::template::Template;
use crate::translation::Dialect;
use crate::types::TypedValue;

/// Convert a single `TypedValue` to a rusqlite `Value`.
#[must_use]
pub fn typed_value_to_sqlite_value(value: &TypedValue) -> Value {
    match value {
        TypedValue::Int(i) => Value::Integer(*i),
        TypedValue::Text(s) => Value::Text(s.clone()),
        TypedValue::Null => Value::Null,
    }
}

/// Convert a column read from `SQLite` into a `TypedValue`.
///
/// `REAL` columns come back as their decimal text; `BLOB` columns have no
/// `TypedValue` counterpart and are rejected.
///
/// # Errors
///
/// Returns [`DriverError`] for `BLOB` columns and for `TEXT` that is not UTF-8.
pub fn sqlite_value_to_typed_value(value: ValueRef<'_>, column: &str) -> Result<TypedValue, DriverError> {
    match value {
        ValueRef::Null => Ok(TypedValue::Null),
        ValueRef::Integer(i) => Ok(TypedValue::Int(i)),
        ValueRef::Real(f) => Ok(TypedValue::Text(f.to_string())),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| TypedValue::Text(s.to_string()))
            .map_err(DriverError::new),
        ValueRef::Blob(_) => Err(DriverError::message(format!(
            "BLOB column {column} cannot be represented as a typed value"
        ))),
    }
}

/// A `SQLite` connection usable as a statement [`Driver`].
///
/// Templates arrive in their authored `?` / `:name` form and are rewritten to
/// numbered `?N` placeholders, one per occurrence, before preparing, so the
/// flat value list lines up even when a name repeats.
#[derive(Debug)]
pub struct SqliteDriver {
    conn: rusqlite::Connection,
}

impl SqliteDriver {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if `rusqlite` cannot open the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        Ok(Self::from_connection(rusqlite::Connection::open(path)?))
    }

    /// # Errors
    ///
    /// Returns [`DriverError`] if `rusqlite` cannot open an in-memory database.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        Ok(Self::from_connection(rusqlite::Connection::open_in_memory()?))
    }

    /// Wrap an already-open `rusqlite` connection.
    #[must_use]
    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// The wrapped connection, for anything this driver does not cover.
    #[must_use]
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Run several `;`-separated statements with no parameters or results,
    /// e.g. schema setup.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for any `SQLite` failure.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DriverError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Driver for SqliteDriver {
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError> {
        let template = Template::parse(sql).map_err(DriverError::new)?;
        let translated = template.translate(Dialect::Sqlite);
        let mut stmt = self.conn.prepare_cached(&translated)?;

        let column_names: Arc<Vec<String>> = Arc::new(
            stmt.column_names()
                .into_iter()
                .map(String::from)
                .collect(),
        );
        let params = rusqlite::params_from_iter(values.iter().map(typed_value_to_sqlite_value));

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut row_values = Vec::with_capacity(column_names.len());
            for (idx, column) in column_names.iter().enumerate() {
                row_values.push(sqlite_value_to_typed_value(row.get_ref(idx)?, column)?);
            }
            out.push(Row::new(Arc::clone(&column_names), row_values));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_conversions() {
        assert_eq!(
            typed_value_to_sqlite_value(&TypedValue::Int(3)),
            Value::Integer(3)
        );
        assert_eq!(
            sqlite_value_to_typed_value(ValueRef::Real(1.5), "r").unwrap(),
            TypedValue::Text("1.5".into())
        );
        assert!(sqlite_value_to_typed_value(ValueRef::Blob(&[1]), "b").is_err());
    }

    #[test]
    fn repeated_named_placeholder_gets_one_value_per_occurrence() {
        let driver = SqliteDriver::open_in_memory().unwrap();
        let rows = driver
            .execute(
                "select :a as x, :a + 1 as y",
                &[TypedValue::Int(4), TypedValue::Int(4)],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("x"), Some(&TypedValue::Int(4)));
        assert_eq!(rows[0].get("y"), Some(&TypedValue::Int(5)));
    }
}
