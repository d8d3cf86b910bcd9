use std::ops::Range;

use crate::error::ParseError;

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// A placeholder-looking token found outside literals and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawToken {
    /// `?`
    Anonymous,
    /// `?` followed directly by digits, e.g. `?3`
    Numbered,
    /// `:name`, stored without the colon
    Named(String),
}

/// Walk `sql` and return every placeholder token with its byte span.
///
/// Quoted strings (`'…'` with `''` escapes), quoted identifiers (`"…"` and
/// `` `…` ``), `--` line comments, nested `/* */` block comments and
/// `$tag$ … $tag$` bodies are skipped. `::` casts are never placeholders.
///
/// Quoting is standard SQL as SQLite and PostgreSQL read it: a quote is
/// escaped only by doubling it, and backslash is an ordinary character, so
/// `'C:\'` is a complete literal. MySQL's `\'` escape is not recognized.
pub(crate) fn scan(sql: &str) -> Result<Vec<(RawToken, Range<usize>)>, ParseError> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut state = State::Normal;
    let mut opened_at = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => {
                opened_at = idx;
                match b {
                    b'\'' => state = State::SingleQuoted,
                    b'"' => state = State::DoubleQuoted,
                    b'`' => state = State::Backticked,
                    b'-' if is_line_comment_start(bytes, idx) => {
                        state = State::LineComment;
                        idx += 1;
                    }
                    b'/' if is_block_comment_start(bytes, idx) => {
                        state = State::BlockComment(1);
                        idx += 1;
                    }
                    b'$' => {
                        if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                            state = State::DollarQuoted(tag);
                            idx = advance;
                        }
                    }
                    b'?' => {
                        let digits_end = scan_digits(bytes, idx + 1);
                        if digits_end > idx + 1 {
                            tokens.push((RawToken::Numbered, idx..digits_end));
                            idx = digits_end - 1;
                        } else {
                            tokens.push((RawToken::Anonymous, idx..idx + 1));
                        }
                    }
                    b':' => {
                        if bytes.get(idx + 1) == Some(&b':') {
                            idx += 1;
                        } else if let Some(end) = scan_identifier(bytes, idx + 1) {
                            let name = sql[idx + 1..end].to_string();
                            tokens.push((RawToken::Named(name), idx..end));
                            idx = end - 1;
                        }
                    }
                    _ => {}
                }
            }
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                if b == b'`' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    match state {
        State::Normal | State::LineComment => Ok(tokens),
        _ => Err(ParseError::UnterminatedLiteral { offset: opened_at }),
    }
}

/// End of the digit run starting at `start` (equal to `start` when there is none).
fn scan_digits(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    idx
}

fn scan_identifier(bytes: &[u8], start: usize) -> Option<usize> {
    let first = *bytes.get(start)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    Some(idx)
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Recognize an opening `$tag$` at `start`; returns the tag and the index of
/// its closing `$`.
fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() {
        // `$1$` is a positional parameter followed by a dollar, not a tag
        if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
            return None;
        }
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

/// Whether the `$` at `idx` opens a closing `$tag$`.
fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len() && &bytes[idx + 1..end] == tag.as_bytes() && bytes[end] == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<RawToken> {
        scan(sql).unwrap().into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn finds_anonymous_and_named_tokens() {
        assert_eq!(
            kinds("select ? , :a_1 from t"),
            vec![RawToken::Anonymous, RawToken::Named("a_1".into())]
        );
    }

    #[test]
    fn records_spans() {
        let tokens = scan("a = :id and b = ?").unwrap();
        assert_eq!(tokens[0].1, 4..7);
        assert_eq!(tokens[1].1, 16..17);
    }

    #[test]
    fn skips_literals_identifiers_and_comments() {
        let sql = "select '?', 'it''s :x', \"col?\", `:y` -- ? :z\n/* ? /* :n */ ? */ from t where a = ?";
        assert_eq!(kinds(sql), vec![RawToken::Anonymous]);
    }

    #[test]
    fn skips_dollar_quoted_bodies() {
        let sql = "select $fn$ ? :x $fn$, $$ ? $$ where a = :a";
        assert_eq!(kinds(sql), vec![RawToken::Named("a".into())]);
    }

    #[test]
    fn casts_are_not_placeholders() {
        assert_eq!(kinds("select x::int, :v::text"), vec![RawToken::Named("v".into())]);
    }

    #[test]
    fn colon_without_identifier_is_plain_text() {
        assert!(kinds("select a[1:2], ': ' from t").is_empty());
    }

    #[test]
    fn numbered_tokens_are_reported() {
        let tokens = scan("select ?12").unwrap();
        assert_eq!(tokens, vec![(RawToken::Numbered, 7..10)]);
    }

    #[test]
    fn unterminated_literal_is_an_error() {
        assert_eq!(
            scan("select 'abc"),
            Err(ParseError::UnterminatedLiteral { offset: 7 })
        );
        assert_eq!(
            scan("select 1 /* open"),
            Err(ParseError::UnterminatedLiteral { offset: 9 })
        );
    }

    #[test]
    fn backslash_does_not_escape_quotes() {
        assert_eq!(kinds(r"select 'C:\', ?"), vec![RawToken::Anonymous]);
        assert_eq!(
            scan(r"select 'O\'Brien' and id = ?"),
            Err(ParseError::UnterminatedLiteral { offset: 16 })
        );
    }

    #[test]
    fn trailing_line_comment_is_fine() {
        assert_eq!(kinds("select ? -- done"), vec![RawToken::Anonymous]);
    }
}
