use serde::{Deserialize, Serialize};

use crate::error::StmtError;
use crate::types::FetchStyle;

/// What to do when a bind call names a placeholder the template lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPlaceholderPolicy {
    /// Fail the bind call with `BindingError::UnknownPlaceholder`.
    #[default]
    Reject,
    /// Log a warning and drop the binding.
    Ignore,
}

/// Per-statement options.
///
/// ```rust
/// use sql_stmt::prelude::*;
///
/// let opts = StatementOptions::from_json_str(r#"{ "default_fetch_style": "associative" }"#)?;
/// assert_eq!(opts.default_fetch_style, FetchStyle::Associative);
/// assert_eq!(opts.unknown_placeholder, UnknownPlaceholderPolicy::Reject);
/// # Ok::<(), StmtError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementOptions {
    /// Shape used by `fetch`/`fetch_all` when the caller passes `None`.
    pub default_fetch_style: FetchStyle,
    pub unknown_placeholder: UnknownPlaceholderPolicy,
}

impl StatementOptions {
    /// Set the shape used when `fetch` is called without a style.
    #[must_use]
    pub fn with_default_fetch_style(mut self, style: FetchStyle) -> Self {
        self.default_fetch_style = style;
        self
    }

    #[must_use]
    pub fn with_unknown_placeholder(mut self, policy: UnknownPlaceholderPolicy) -> Self {
        self.unknown_placeholder = policy;
        self
    }

    /// Load options from a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StmtError::Config`] when the JSON is malformed or names an
    /// unknown style or policy.
    pub fn from_json_str(json: &str) -> Result<Self, StmtError> {
        Ok(serde_json::from_str(json)?)
    }
}
