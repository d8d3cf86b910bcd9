use std::fmt;
use std::sync::{Arc, Mutex};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Values that travel to the driver as parameters and come back in rows.
///
/// ```rust
/// use sql_stmt::prelude::*;
///
/// let params = vec![
///     TypedValue::Int(1),
///     TypedValue::Text("alice".into()),
///     TypedValue::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Text/string value
    Text(String),
    /// NULL value
    #[default]
    Null,
}

impl TypedValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the integer payload, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let TypedValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Borrow the text payload, if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let TypedValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// The declared type this value naturally carries. `Null` reports `String`.
    #[must_use]
    pub fn natural_type(&self) -> ParamType {
        match self {
            TypedValue::Int(_) => ParamType::Integer,
            TypedValue::Text(_) | TypedValue::Null => ParamType::String,
        }
    }

    /// Coerce into `declared`, or `None` when the value cannot represent it.
    ///
    /// `Null` passes through either type untouched.
    #[must_use]
    pub fn coerce(self, declared: ParamType) -> Option<TypedValue> {
        match (declared, self) {
            (_, TypedValue::Null) => Some(TypedValue::Null),
            (ParamType::Integer, TypedValue::Int(i)) => Some(TypedValue::Int(i)),
            (ParamType::Integer, TypedValue::Text(s)) => {
                s.trim().parse::<i64>().ok().map(TypedValue::Int)
            }
            (ParamType::String, TypedValue::Int(i)) => Some(TypedValue::Text(i.to_string())),
            (ParamType::String, TypedValue::Text(s)) => Some(TypedValue::Text(s)),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(i) => write!(f, "{i}"),
            TypedValue::Text(s) => write!(f, "'{s}'"),
            TypedValue::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Int(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        TypedValue::Int(i64::from(value))
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::Text(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Text(value.to_string())
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TypedValue::Null, Into::into)
    }
}

/// The type a parameter is declared with when it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => f.write_str("string"),
            ParamType::Integer => f.write_str("integer"),
        }
    }
}

/// A shared, mutable slot used for bind-by-reference parameters.
///
/// Clones share the same slot: the caller keeps one clone and writes into it,
/// the statement keeps another and reads it each time it executes.
///
/// ```rust
/// use sql_stmt::prelude::*;
///
/// let cell = ParamCell::new(1);
/// let bound = cell.clone();
/// cell.set(2);
/// assert_eq!(bound.get(), TypedValue::Int(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamCell {
    slot: Arc<Mutex<TypedValue>>,
}

impl ParamCell {
    /// Create a fresh slot holding `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The initial value; anything convertible into [`TypedValue`]
    ///
    /// # Returns
    ///
    /// A handle with no other clones yet
    #[must_use]
    pub fn new(value: impl Into<TypedValue>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value.into())),
        }
    }

    /// Replace the value the next execution will read.
    pub fn set(&self, value: impl Into<TypedValue>) {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = value.into();
    }

    /// Snapshot the current value.
    #[must_use]
    pub fn get(&self) -> TypedValue {
        match self.slot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether two handles point at the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &ParamCell) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

/// Shape a fetched row is materialized into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FetchStyle {
    /// Column values only, indexed by position
    Positional,
    /// Column name to value; later duplicate names overwrite earlier ones
    Associative,
    /// Every value twice: under its position and under its column name
    #[default]
    Both,
    /// A map-backed record with one field per column name
    Object,
}
