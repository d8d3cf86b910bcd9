use std::borrow::Cow;
use std::fmt::Write;

use crate::template::Template;

/// Numbered placeholder dialect a driver's engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite-style placeholders like `?1` (also used by LibSQL/Turso).
    Sqlite,
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
}

impl Dialect {
    fn prefix(self) -> char {
        match self {
            Dialect::Sqlite => '?',
            Dialect::Postgres => '$',
        }
    }
}

impl Template {
    /// Render the template with each placeholder occurrence replaced by a
    /// 1-based numbered placeholder in `dialect`.
    ///
    /// Numbers follow occurrence order, so a named placeholder used twice gets
    /// two numbers that line up with the resolved value list. Text inside
    /// literals and comments is copied verbatim. Returns a borrowed `Cow` when
    /// there is nothing to replace.
    ///
    /// ```rust
    /// use sql_stmt::prelude::*;
    ///
    /// let tpl = Template::parse("select :a, ':b', :a")?;
    /// assert_eq!(tpl.translate(Dialect::Postgres), "select $1, ':b', $2");
    /// # Ok::<(), ParseError>(())
    /// ```
    #[must_use]
    pub fn translate(&self, dialect: Dialect) -> Cow<'_, str> {
        let sql = self.sql();
        if self.placeholders().is_empty() {
            return Cow::Borrowed(sql);
        }

        let mut out = String::with_capacity(sql.len() + self.placeholder_count() * 2);
        let mut copied = 0;
        for placeholder in self.placeholders() {
            out.push_str(&sql[copied..placeholder.span.start]);
            // Writing into a String cannot fail
            let _ = write!(
                out,
                "{}{}",
                dialect.prefix(),
                placeholder.position_index + 1
            );
            copied = placeholder.span.end;
        }
        out.push_str(&sql[copied..]);
        Cow::Owned(out)
    }
}
