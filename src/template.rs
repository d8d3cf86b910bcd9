use std::ops::Range;

use crate::error::ParseError;

mod scanner;

use scanner::RawToken;

/// Which placeholder syntax a template uses. A template never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// No placeholders at all.
    None,
    /// `?` tokens, matched by left-to-right order.
    Positional,
    /// `:name` tokens, matched by name.
    Named,
}

/// One placeholder occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// 0-based occurrence index in left-to-right scan order.
    pub position_index: usize,
    /// Name without the leading colon; `None` for `?`.
    pub name: Option<String>,
    /// Byte range of the token inside the template.
    pub span: Range<usize>,
}

impl PlaceholderRef {
    /// `:name` for named placeholders, `?N` (1-based) for positional ones.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!(":{name}"),
            None => format!("?{}", self.position_index + 1),
        }
    }
}

/// An immutable SQL template together with the placeholders found in it.
///
/// ```rust
/// use sql_stmt::prelude::*;
///
/// let tpl = Template::parse("SELECT * FROM t WHERE a = :cid OR b = :cid")?;
/// assert_eq!(tpl.style(), PlaceholderStyle::Named);
/// assert_eq!(tpl.placeholder_count(), 2);
/// assert_eq!(tpl.names(), vec!["cid"]);
/// # Ok::<(), ParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    sql: String,
    style: PlaceholderStyle,
    placeholders: Vec<PlaceholderRef>,
}

impl Template {
    /// Scan `sql` and record its placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MixedPlaceholderStyle`] when `?` and `:name` both
    /// appear, [`ParseError::NumberedPlaceholder`] for `?N` tokens and
    /// [`ParseError::UnterminatedLiteral`] for an unclosed quote or comment.
    pub fn parse(sql: impl Into<String>) -> Result<Self, ParseError> {
        let sql = sql.into();
        let mut style = PlaceholderStyle::None;
        let mut placeholders = Vec::new();

        for (token, span) in scanner::scan(&sql)? {
            let (token_style, name) = match token {
                RawToken::Numbered => {
                    return Err(ParseError::NumberedPlaceholder { offset: span.start });
                }
                RawToken::Anonymous => (PlaceholderStyle::Positional, None),
                RawToken::Named(name) => (PlaceholderStyle::Named, Some(name)),
            };
            if style == PlaceholderStyle::None {
                style = token_style;
            } else if style != token_style {
                return Err(ParseError::MixedPlaceholderStyle { offset: span.start });
            }
            placeholders.push(PlaceholderRef {
                position_index: placeholders.len(),
                name,
                span,
            });
        }

        tracing::trace!(
            placeholders = placeholders.len(),
            ?style,
            "parsed SQL template"
        );

        Ok(Self {
            sql,
            style,
            placeholders,
        })
    }

    /// The SQL exactly as authored.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The single placeholder style found by [`parse`](Self::parse);
    /// [`PlaceholderStyle::None`] when the template has no placeholders.
    #[must_use]
    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Every placeholder occurrence, in left-to-right order.
    #[must_use]
    pub fn placeholders(&self) -> &[PlaceholderRef] {
        &self.placeholders
    }

    /// Number of placeholder occurrences (a repeated name counts each time).
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Distinct placeholder names in order of first appearance.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.placeholders.iter().filter_map(|p| p.name.as_deref()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Whether a named placeholder `name` (with or without a leading colon) occurs.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.placeholders
            .iter()
            .any(|p| p.name.as_deref() == Some(name))
    }
}
