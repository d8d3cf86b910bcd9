use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::row::Row;
use crate::types::{FetchStyle, TypedValue};

/// Key of a value in a [`FetchStyle::Both`] row.
///
/// A column name spelled as a canonical decimal integer (`"1"`, not `"01"`)
/// is the same key as that position, so `SELECT 1, 2` yields the keys
/// `0, 1, 2` rather than two different keys that both print as `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Index(usize),
    Name(String),
}

impl RowKey {
    /// Key for column `name`: [`RowKey::Index`] when the name is a
    /// canonical decimal integer, [`RowKey::Name`] otherwise.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.parse::<usize>() {
            Ok(index) if index.to_string() == name => RowKey::Index(index),
            _ => RowKey::Name(name),
        }
    }
}

impl From<usize> for RowKey {
    fn from(value: usize) -> Self {
        RowKey::Index(value)
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey::column(value)
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        RowKey::column(value)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Index(i) => write!(f, "{i}"),
            RowKey::Name(name) => f.write_str(name),
        }
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowKey::Index(i) => serializer.serialize_u64(*i as u64),
            RowKey::Name(name) => serializer.serialize_str(name),
        }
    }
}

/// An insertion-ordered map from keys to values.
///
/// Inserting an existing key replaces its value but keeps its original
/// position, so a later duplicate column overwrites an earlier one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyedRow<K: Hash + Eq> {
    entries: IndexMap<K, TypedValue>,
}

impl<K: Hash + Eq> Default for KeyedRow<K> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> KeyedRow<K> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, key: K, value: TypedValue) {
        self.entries.insert(key, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &TypedValue)> {
        self.entries.iter()
    }

    /// Keys in first-insertion order; a duplicate column keeps the slot of
    /// its first occurrence.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}

impl KeyedRow<String> {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.entries.get(key)
    }
}

impl KeyedRow<RowKey> {
    /// Look up by position or column name; numeric names resolve as
    /// positions (see [`RowKey::column`]).
    #[must_use]
    pub fn get(&self, key: impl Into<RowKey>) -> Option<&TypedValue> {
        self.entries.get(&key.into())
    }
}

/// A structurally anonymous record with one field per column name.
///
/// Columns are only known at query time, so fields live in a map rather than
/// a static struct. Duplicate column names keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowObject {
    fields: KeyedRow<String>,
}

impl RowObject {
    /// Read a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.get(field).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A row materialized into the shape requested by a [`FetchStyle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedRow {
    Positional(Vec<TypedValue>),
    Associative(KeyedRow<String>),
    Both(KeyedRow<RowKey>),
    Object(RowObject),
}

impl FetchedRow {
    /// Value at column position `index`, for shapes that carry positions.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&TypedValue> {
        match self {
            FetchedRow::Positional(values) => values.get(index),
            FetchedRow::Both(row) => row.get(index),
            FetchedRow::Associative(_) | FetchedRow::Object(_) => None,
        }
    }

    /// Value under column name `name`, for shapes that carry names.
    #[must_use]
    pub fn get_name(&self, name: &str) -> Option<&TypedValue> {
        match self {
            FetchedRow::Associative(row) => row.get(name),
            FetchedRow::Both(row) => row.get(name),
            FetchedRow::Object(obj) => obj.get(name),
            FetchedRow::Positional(_) => None,
        }
    }

    #[must_use]
    pub fn style(&self) -> FetchStyle {
        match self {
            FetchedRow::Positional(_) => FetchStyle::Positional,
            FetchedRow::Associative(_) => FetchStyle::Associative,
            FetchedRow::Both(_) => FetchStyle::Both,
            FetchedRow::Object(_) => FetchStyle::Object,
        }
    }
}

impl Serialize for FetchedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FetchedRow::Positional(values) => values.serialize(serializer),
            FetchedRow::Associative(row) => row.serialize(serializer),
            FetchedRow::Both(row) => row.serialize(serializer),
            FetchedRow::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl Row {
    /// Materialize this row into `style`.
    #[must_use]
    pub fn materialize(&self, style: FetchStyle) -> FetchedRow {
        match style {
            FetchStyle::Positional => FetchedRow::Positional(self.values.clone()),
            FetchStyle::Associative => FetchedRow::Associative(self.by_name()),
            FetchStyle::Object => FetchedRow::Object(RowObject {
                fields: self.by_name(),
            }),
            FetchStyle::Both => {
                let mut both = KeyedRow::with_capacity(self.len() * 2);
                for (idx, (name, value)) in self.iter().enumerate() {
                    both.insert(RowKey::Index(idx), value.clone());
                    both.insert(RowKey::column(name), value.clone());
                }
                FetchedRow::Both(both)
            }
        }
    }

    fn by_name(&self) -> KeyedRow<String> {
        let mut row = KeyedRow::with_capacity(self.len());
        for (name, value) in self.iter() {
            row.insert(name.to_string(), value.clone());
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> Row {
        Row::from_pairs([("name", "John".into()), ("email", "j@x.com".into())])
    }

    #[test]
    fn positional_shape() {
        assert_eq!(
            john().materialize(FetchStyle::Positional),
            FetchedRow::Positional(vec!["John".into(), "j@x.com".into()])
        );
    }

    #[test]
    fn associative_shape() {
        let fetched = john().materialize(FetchStyle::Associative);
        assert_eq!(fetched.get_name("name"), Some(&"John".into()));
        assert_eq!(fetched.get_name("email"), Some(&"j@x.com".into()));
        assert_eq!(fetched.get_index(0), None);
    }

    #[test]
    fn both_shape_interleaves_index_and_name() {
        let FetchedRow::Both(row) = john().materialize(FetchStyle::Both) else {
            panic!("expected Both shape");
        };
        let keys: Vec<String> = row.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["0", "name", "1", "email"]);
        assert_eq!(row.get(1usize), Some(&"j@x.com".into()));
        assert_eq!(row.get("name"), Some(&"John".into()));
    }

    #[test]
    fn duplicate_names_overwrite_in_place() {
        let row = Row::from_pairs([
            ("id", TypedValue::Int(1)),
            ("x", TypedValue::Int(2)),
            ("id", TypedValue::Int(3)),
        ]);
        let FetchedRow::Associative(assoc) = row.materialize(FetchStyle::Associative) else {
            panic!("expected Associative shape");
        };
        assert_eq!(assoc.len(), 2);
        assert_eq!(assoc.get("id"), Some(&TypedValue::Int(3)));

        let FetchedRow::Both(both) = row.materialize(FetchStyle::Both) else {
            panic!("expected Both shape");
        };
        assert_eq!(both.len(), 5);
        assert_eq!(both.get(0usize), Some(&TypedValue::Int(1)));
        assert_eq!(both.get(2usize), Some(&TypedValue::Int(3)));
        assert_eq!(both.get("id"), Some(&TypedValue::Int(3)));
    }

    #[test]
    fn object_duplicate_names_keep_last_value() {
        let row = Row::from_pairs([("id", TypedValue::Int(1)), ("id", TypedValue::Int(2))]);
        let FetchedRow::Object(obj) = row.materialize(FetchStyle::Object) else {
            panic!("expected Object shape");
        };
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.get("id"), Some(&TypedValue::Int(2)));
        assert_eq!(serde_json::to_string(&obj).unwrap(), r#"{"id":2}"#);
    }

    #[test]
    fn numeric_column_names_share_position_keys() {
        assert_eq!(RowKey::column("7"), RowKey::Index(7));
        assert_eq!(RowKey::column("07"), RowKey::Name("07".into()));
        assert_eq!(RowKey::column("-1"), RowKey::Name("-1".into()));
        assert_eq!(RowKey::from("id"), RowKey::Name("id".into()));

        let row = Row::from_pairs([("1", TypedValue::Int(1)), ("2", TypedValue::Int(2))]);
        let FetchedRow::Both(both) = row.materialize(FetchStyle::Both) else {
            panic!("expected Both shape");
        };
        let keys: Vec<String> = both.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["0", "1", "2"]);
        assert_eq!(both.get(1usize), Some(&TypedValue::Int(2)));
        assert_eq!(both.get("1"), Some(&TypedValue::Int(2)));
    }

    #[test]
    fn object_shape_exposes_fields() {
        let FetchedRow::Object(obj) = john().materialize(FetchStyle::Object) else {
            panic!("expected Object shape");
        };
        assert!(obj.has_field("email"));
        assert_eq!(obj.field_names().collect::<Vec<_>>(), vec!["name", "email"]);
    }

    #[test]
    fn serializes_to_json_shapes() {
        let both = serde_json::to_string(&john().materialize(FetchStyle::Both)).unwrap();
        assert_eq!(
            both,
            r#"{"0":"John","name":"John","1":"j@x.com","email":"j@x.com"}"#
        );
        let positional = serde_json::to_string(&john().materialize(FetchStyle::Positional)).unwrap();
        assert_eq!(positional, r#"["John","j@x.com"]"#);
    }
}
