//! In-memory driver for exercising statements without a database.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::driver::{Driver, DriverError};
use crate::results::Row;
use crate::types::TypedValue;

/// One `execute` call as the driver saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub sql: String,
    pub values: Vec<TypedValue>,
}

type Handler = Box<dyn Fn(&str, &[TypedValue]) -> Result<Vec<Row>, DriverError> + Send + Sync>;

enum Scripted {
    Rows(Vec<Row>),
    Fail(String),
}

/// Driver that records every call and answers from a script.
///
/// Queued responses are consumed first, in order; once the queue is empty the
/// handler (if any) answers, otherwise an empty row list is returned.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<RecordedCall>>,
    script: Mutex<VecDeque<Scripted>>,
    handler: Option<Handler>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl RecordingDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer unscripted calls with `handler`.
    #[must_use]
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &[TypedValue]) -> Result<Vec<Row>, DriverError> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::default()
        }
    }

    /// Driver that returns each call's values back as a single row with
    /// columns `p0`, `p1`, ...
    #[must_use]
    pub fn echo() -> Self {
        Self::with_handler(|_, values| {
            let pairs = values
                .iter()
                .enumerate()
                .map(|(idx, value)| (format!("p{idx}"), value.clone()));
            Ok(vec![Row::from_pairs(pairs)])
        })
    }

    /// Queue rows for the next unanswered call.
    pub fn push_rows(&self, rows: Vec<Row>) {
        lock(&self.script).push_back(Scripted::Rows(rows));
    }

    /// Queue a failure for the next unanswered call.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Fail(message.into()));
    }

    /// Every call seen so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        lock(&self.calls).last().cloned()
    }
}

impl fmt::Debug for RecordingDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingDriver")
            .field("calls", &lock(&self.calls).len())
            .field("scripted", &lock(&self.script).len())
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Driver for RecordingDriver {
    fn execute(&self, sql: &str, values: &[TypedValue]) -> Result<Vec<Row>, DriverError> {
        lock(&self.calls).push(RecordedCall {
            sql: sql.to_string(),
            values: values.to_vec(),
        });
        let scripted = lock(&self.script).pop_front();
        match scripted {
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Fail(message)) => Err(DriverError::message(message)),
            None => match &self.handler {
                Some(handler) => handler(sql, values),
                None => Ok(Vec::new()),
            },
        }
    }
}
