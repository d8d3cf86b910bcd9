use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::results::Row;
use crate::types::TypedValue;

/// Whatever the underlying database reported, carried through untouched.
///
/// This layer never inspects or translates driver failures; callers that care
/// about engine-specific codes can reach the source with [`DriverError::inner`]
/// or `downcast_ref`.
#[derive(Debug)]
pub struct DriverError(Box<dyn StdError + Send + Sync + 'static>);

impl DriverError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Box::new(err))
    }

    /// Build an error from a plain message, for drivers without a native error type.
    pub fn message(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Self(msg.into())
    }

    #[must_use]
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver error: {}", self.0)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        DriverError::new(err)
    }
}

/// The one capability a statement needs from a database connection.
///
/// `sql` is the template exactly as authored; `values` is the flat list of
/// resolved parameters in placeholder occurrence order. Drivers whose engine
/// cannot consume the template's placeholders directly can rewrite it with
/// [`Template::translate`](crate::template::Template::translate).
pub trait Driver {
    /// Run `sql` with `values` and return every produced row.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for any failure the engine reports.
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError> {
        (**self).execute(sql, values)
    }
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError> {
        (**self).execute(sql, values)
    }
}

impl<D: Driver + ?Sized> Driver for Arc<D> {
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError> {
        (**self).execute(sql, values)
    }
}
