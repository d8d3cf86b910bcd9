use thiserror::Error;

use crate::driver::DriverError;
use crate::types::{ParamType, TypedValue};

/// Errors raised while scanning a SQL template for placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("template mixes `?` and `:name` placeholders (second style at byte {offset})")]
    MixedPlaceholderStyle { offset: usize },

    #[error("numbered placeholder at byte {offset} is not supported; use `?` or `:name`")]
    NumberedPlaceholder { offset: usize },

    #[error("unterminated quoted literal or comment starting at byte {offset}")]
    UnterminatedLiteral { offset: usize },
}

/// Errors raised by binding parameters or resolving them for execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("placeholder {0} does not appear in the template")]
    UnknownPlaceholder(String),

    #[error("placeholder {0} has no bound value")]
    UnboundPlaceholder(String),

    #[error("execute arguments cannot be combined with explicit bindings")]
    ConflictingBinding,

    #[error("expected {expected} execute arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("execute arguments require a positional template")]
    ArgumentsForNamedTemplate,

    #[error("placeholder {placeholder} declared {declared} cannot take {value}")]
    TypeMismatch {
        placeholder: String,
        declared: ParamType,
        value: TypedValue,
    },
}

#[derive(Debug, Error)]
pub enum StmtError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(
        "result set from execution {generation} is stale; statement has since run execution {current}"
    )]
    StaleResultSet { generation: u64, current: u64 },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StmtError {
    fn from(err: serde_json::Error) -> Self {
        StmtError::Config(err.to_string())
    }
}
