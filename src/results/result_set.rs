use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::fetch::FetchedRow;
use super::row::Row;
use crate::error::StmtError;
use crate::types::{FetchStyle, TypedValue};

#[derive(Debug)]
struct Inner {
    rows: Vec<Row>,
    column_names: Arc<Vec<String>>,
    cursor: AtomicUsize,
    generation: u64,
    /// The owning statement's latest execution number.
    current: Arc<AtomicU64>,
    default_style: FetchStyle,
}

/// The rows produced by one execution, read through a forward-only cursor.
///
/// Handles are cheap to clone and share one cursor. Once the statement that
/// produced a result set runs again, every handle to the old result set
/// becomes stale and fetching from it fails with
/// [`StmtError::StaleResultSet`] instead of returning rows from the wrong
/// execution.
#[derive(Debug, Clone)]
pub struct ResultSet {
    inner: Arc<Inner>,
}

impl ResultSet {
    pub(crate) fn new(
        rows: Vec<Row>,
        generation: u64,
        current: Arc<AtomicU64>,
        default_style: FetchStyle,
    ) -> Self {
        let column_names = rows
            .first()
            .map(|row| Arc::clone(&row.column_names))
            .unwrap_or_default();
        Self {
            inner: Arc::new(Inner {
                rows,
                column_names,
                cursor: AtomicUsize::new(0),
                generation,
                current,
                default_style,
            }),
        }
    }

    /// A result set that is not tied to any statement and never goes stale.
    #[must_use]
    pub fn detached(rows: Vec<Row>, default_style: FetchStyle) -> Self {
        Self::new(rows, 0, Arc::new(AtomicU64::new(0)), default_style)
    }

    fn ensure_fresh(&self) -> Result<(), StmtError> {
        let current = self.inner.current.load(Ordering::Acquire);
        if current == self.inner.generation {
            Ok(())
        } else {
            Err(StmtError::StaleResultSet {
                generation: self.inner.generation,
                current,
            })
        }
    }

    fn advance(&self) -> Option<&Row> {
        let len = self.inner.rows.len();
        self.inner
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pos| {
                (pos < len).then_some(pos + 1)
            })
            .ok()
            .and_then(|pos| self.inner.rows.get(pos))
    }

    /// Next unread row in `style` (the result's default style when `None`),
    /// or `Ok(None)` once the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::StaleResultSet`] if the statement has executed again.
    pub fn fetch(
        &self,
        style: impl Into<Option<FetchStyle>>,
    ) -> Result<Option<FetchedRow>, StmtError> {
        self.ensure_fresh()?;
        let style = style.into().unwrap_or(self.inner.default_style);
        Ok(self.advance().map(|row| row.materialize(style)))
    }

    /// Drain every remaining row from the current cursor position.
    ///
    /// An exhausted cursor yields an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::StaleResultSet`] if the statement has executed again.
    pub fn fetch_all(
        &self,
        style: impl Into<Option<FetchStyle>>,
    ) -> Result<Vec<FetchedRow>, StmtError> {
        self.ensure_fresh()?;
        let style = style.into().unwrap_or(self.inner.default_style);
        let len = self.inner.rows.len();
        let start = self.inner.cursor.swap(len, Ordering::AcqRel).min(len);
        Ok(self.inner.rows[start..]
            .iter()
            .map(|row| row.materialize(style))
            .collect())
    }

    /// Value of column `index` in the next unread row.
    ///
    /// The row is consumed even when it has no such column; both that case
    /// and exhaustion return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::StaleResultSet`] if the statement has executed again.
    pub fn fetch_column(&self, index: usize) -> Result<Option<TypedValue>, StmtError> {
        self.ensure_fresh()?;
        Ok(self
            .advance()
            .and_then(|row| row.get_by_index(index).cloned()))
    }

    /// Total rows produced by the execution, read or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.rows.is_empty()
    }

    /// Rows not yet consumed by the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len()
            .saturating_sub(self.inner.cursor.load(Ordering::Acquire))
    }

    /// Column names of the result (empty when no rows came back).
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.inner.column_names
    }

    /// The execution number that produced this result set.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Whether the producing statement has since executed again.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.ensure_fresh().is_err()
    }
}
