use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::binder::{ParamRef, ParameterBinder};
use crate::config::StatementOptions;
use crate::driver::Driver;
use crate::error::StmtError;
use crate::results::{FetchedRow, ResultSet};
use crate::template::{PlaceholderStyle, Template};
use crate::types::{FetchStyle, ParamCell, ParamType, TypedValue};

/// A parsed template plus its bindings, executable any number of times
/// against one driver.
///
/// A statement has a single logical owner: binding and executing take
/// `&mut self` and there is no internal locking.
///
/// ```rust
/// # #[cfg(feature = "test-utils")] {
/// use sql_stmt::prelude::*;
/// use sql_stmt::test_utils::RecordingDriver;
///
/// let driver = RecordingDriver::new();
/// driver.push_rows(vec![Row::from_pairs([("name", TypedValue::from("John"))])]);
///
/// let mut stmt = PreparedStatement::prepare(&driver, "SELECT name FROM users WHERE id = :id", StatementOptions::default())?;
/// stmt.bind_value("id", 1, ParamType::Integer)?;
/// stmt.execute()?;
/// let row = stmt.fetch(FetchStyle::Associative)?.expect("one row");
/// assert_eq!(row.get_name("name"), Some(&TypedValue::from("John")));
/// # }
/// # Ok::<(), sql_stmt::StmtError>(())
/// ```
#[derive(Debug)]
pub struct PreparedStatement<'c, D: Driver + ?Sized> {
    driver: &'c D,
    binder: ParameterBinder,
    options: StatementOptions,
    executions: Arc<AtomicU64>,
    current: Option<ResultSet>,
}

impl<'c, D: Driver + ?Sized> PreparedStatement<'c, D> {
    /// Parse `sql` and tie the statement to `driver`. Nothing is sent yet.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Parse`] if the template cannot be parsed.
    pub fn prepare(
        driver: &'c D,
        sql: impl Into<String>,
        options: StatementOptions,
    ) -> Result<Self, StmtError> {
        let template = Template::parse(sql)?;
        tracing::debug!(
            sql = template.sql(),
            placeholders = template.placeholder_count(),
            "prepared statement"
        );
        Ok(Self {
            driver,
            binder: ParameterBinder::new(template, options.unknown_placeholder),
            options,
            executions: Arc::new(AtomicU64::new(0)),
            current: None,
        })
    }

    /// Bind a snapshot of `value` to `param`.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Binding`] if `param` is not in the template.
    pub fn bind_value(
        &mut self,
        param: impl Into<ParamRef>,
        value: impl Into<TypedValue>,
        declared: ParamType,
    ) -> Result<&mut Self, StmtError> {
        self.binder.bind_value(param, value, declared)?;
        Ok(self)
    }

    /// Bind `cell` to `param`; its contents are read at each execution.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Binding`] if `param` is not in the template.
    pub fn bind_param(
        &mut self,
        param: impl Into<ParamRef>,
        cell: &ParamCell,
        declared: ParamType,
    ) -> Result<&mut Self, StmtError> {
        self.binder.bind_param(param, cell, declared)?;
        Ok(self)
    }

    /// Drop every binding.
    pub fn clear_bindings(&mut self) {
        self.binder.clear();
    }

    /// Resolve the current bindings and run the statement.
    ///
    /// The returned handle is also kept as the statement's current result set;
    /// any result set from an earlier execution becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Binding`] when bindings cannot be resolved and
    /// [`StmtError::Driver`] for anything the driver reports. A failed
    /// execution leaves the previous result set untouched.
    pub fn execute(&mut self) -> Result<ResultSet, StmtError> {
        let values = self.binder.resolve()?;
        self.run(&values)
    }

    /// Run a positional template with `args` bound by value to ordinals
    /// 0..n in one step. An empty slice behaves like [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Binding`] if explicit bindings already exist, the
    /// template is named, or the argument count differs from the placeholder
    /// count; [`StmtError::Driver`] for driver failures.
    pub fn execute_with(&mut self, args: &[TypedValue]) -> Result<ResultSet, StmtError> {
        if args.is_empty() {
            return self.execute();
        }
        let values = self.binder.resolve_args(args)?;
        self.run(&values)
    }

    fn run(&mut self, values: &[TypedValue]) -> Result<ResultSet, StmtError> {
        let sql = self.binder.template().sql();
        tracing::debug!(sql, values = values.len(), "executing statement");
        let rows = self.driver.execute(sql, values)?;

        let generation = self.executions.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(rows = rows.len(), generation, "statement returned");
        let result = ResultSet::new(
            rows,
            generation,
            Arc::clone(&self.executions),
            self.options.default_fetch_style,
        );
        self.current = Some(result.clone());
        Ok(result)
    }

    /// Next row of the current result set; `Ok(None)` when exhausted or never executed.
    ///
    /// # Errors
    ///
    /// Forwards any error from [`ResultSet::fetch`].
    pub fn fetch(
        &self,
        style: impl Into<Option<FetchStyle>>,
    ) -> Result<Option<FetchedRow>, StmtError> {
        match &self.current {
            Some(result) => result.fetch(style),
            None => Ok(None),
        }
    }

    /// Remaining rows of the current result set.
    ///
    /// # Errors
    ///
    /// Forwards any error from [`ResultSet::fetch_all`].
    pub fn fetch_all(
        &self,
        style: impl Into<Option<FetchStyle>>,
    ) -> Result<Vec<FetchedRow>, StmtError> {
        match &self.current {
            Some(result) => result.fetch_all(style),
            None => Ok(Vec::new()),
        }
    }

    /// Column `index` of the next row of the current result set.
    ///
    /// # Errors
    ///
    /// Forwards any error from [`ResultSet::fetch_column`].
    pub fn fetch_column(&self, index: usize) -> Result<Option<TypedValue>, StmtError> {
        match &self.current {
            Some(result) => result.fetch_column(index),
            None => Ok(None),
        }
    }

    /// The result set of the latest successful execution.
    #[must_use]
    pub fn result_set(&self) -> Option<&ResultSet> {
        self.current.as_ref()
    }

    /// Rows produced by the latest execution.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.current.as_ref().map_or(0, ResultSet::len)
    }

    /// Columns in the latest result set.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.current
            .as_ref()
            .map_or(0, |result| result.column_names().len())
    }

    /// Number of successful executions so far.
    #[must_use]
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Acquire)
    }

    /// Access the raw SQL string of the prepared statement.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.binder.template().sql()
    }

    /// The parsed template this statement was prepared from.
    #[must_use]
    pub fn template(&self) -> &Template {
        self.binder.template()
    }

    #[must_use]
    pub fn style(&self) -> PlaceholderStyle {
        self.binder.template().style()
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.binder.template().placeholder_count()
    }

    /// Options this statement was prepared with.
    #[must_use]
    pub fn options(&self) -> StatementOptions {
        self.options
    }

    /// Template and binding listing for debugging.
    #[must_use]
    pub fn debug_dump_params(&self) -> String {
        self.binder.describe()
    }
}

/// A driver plus the options every statement prepared through it starts with.
#[derive(Debug)]
pub struct Connection<D: Driver> {
    driver: D,
    options: StatementOptions,
}

impl<D: Driver> Connection<D> {
    /// Wrap `driver` with default [`StatementOptions`].
    pub fn new(driver: D) -> Self {
        Self::with_options(driver, StatementOptions::default())
    }

    /// Wrap `driver`; every statement prepared through this connection
    /// starts with `options`.
    ///
    /// # Arguments
    ///
    /// * `driver` - The driver statements execute against
    /// * `options` - Default fetch style and unknown-placeholder policy
    ///
    /// # Returns
    ///
    /// A connection that owns `driver`
    pub fn with_options(driver: D, options: StatementOptions) -> Self {
        Self { driver, options }
    }

    /// Parse `sql` into a statement bound to this connection's driver.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Parse`] if the template cannot be parsed.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<PreparedStatement<'_, D>, StmtError> {
        PreparedStatement::prepare(&self.driver, sql, self.options)
    }

    /// Prepare and execute a statement that takes no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Parse`], [`StmtError::Binding`] (the SQL has
    /// placeholders) or [`StmtError::Driver`].
    pub fn query(&self, sql: impl Into<String>) -> Result<ResultSet, StmtError> {
        self.prepare(sql)?.execute()
    }

    /// Borrow the underlying driver, e.g. for schema setup.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    #[must_use]
    pub fn options(&self) -> StatementOptions {
        self.options
    }

    /// Give the driver back. Statements borrow the connection, so none can
    /// outlive this call.
    pub fn into_driver(self) -> D {
        self.driver
    }
}
