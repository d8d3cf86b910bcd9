use std::sync::Arc;

use crate::types::TypedValue;

/// A row as produced by a driver: fixed-width, ordered `(column, value)` pairs.
///
/// Column names are shared across all rows of one result, so building a row
/// from an existing `Arc` does not copy them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<TypedValue>,
}

impl Row {
    /// Create a new database row
    ///
    /// Extra values beyond the column count are dropped and missing ones are
    /// filled with `NULL` so the row always matches its column list.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, mut values: Vec<TypedValue>) -> Self {
        values.resize(column_names.len(), TypedValue::Null);
        Self {
            column_names,
            values,
        }
    }

    /// Build a row from `(column, value)` pairs.
    ///
    /// ```rust
    /// use sql_stmt::prelude::*;
    ///
    /// let row = Row::from_pairs([("name", "John".into()), ("id", TypedValue::Int(7))]);
    /// assert_eq!(row.get("id"), Some(&TypedValue::Int(7)));
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, TypedValue)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<TypedValue>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Self {
            column_names: Arc::new(names),
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column name. When several columns share the name the
    /// rightmost one is returned, matching associative fetches.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&TypedValue> {
        self.column_names
            .iter()
            .rposition(|col| col == column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&TypedValue> {
        self.values.get(index)
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
