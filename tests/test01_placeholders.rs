use sql_stmt::prelude::*;

#[test]
fn positional_ordinals_increase_left_to_right() {
    let templates = [
        "SELECT ?",
        "INSERT INTO t (a, b, c) VALUES (?, ?, ?)",
        "SELECT * FROM t WHERE a = ? AND b IN (?, ?) -- trailing ?\nAND c = ?",
        "UPDATE t SET note = 'what?' , a = ? WHERE id = ?",
    ];
    for sql in templates {
        let tpl = Template::parse(sql).unwrap();
        assert_eq!(tpl.style(), PlaceholderStyle::Positional, "{sql}");
        for (expected, placeholder) in tpl.placeholders().iter().enumerate() {
            assert_eq!(placeholder.position_index, expected, "{sql}");
            assert_eq!(&sql[placeholder.span.clone()], "?");
        }
        let starts: Vec<usize> = tpl.placeholders().iter().map(|p| p.span.start).collect();
        assert!(starts.windows(2).all(|w| w[0] < w[1]), "{sql}");
    }
}

#[test]
fn mixing_styles_always_fails() {
    let mixed = [
        "SELECT ? , :a",
        "SELECT :a , ?",
        "SELECT :a , :b , ?",
        "SELECT ? , ? , :b , ?",
    ];
    for sql in mixed {
        assert!(
            matches!(
                Template::parse(sql),
                Err(ParseError::MixedPlaceholderStyle { .. })
            ),
            "{sql}"
        );
    }
}

#[test]
fn quoted_and_commented_tokens_do_not_count() {
    // Named tokens hidden in literals must not make this a mixed template.
    let tpl = Template::parse(
        "SELECT ':skip', \"col:x\", ? /* :c */ FROM t WHERE ts > '12:30:00' AND a = ?",
    )
    .unwrap();
    assert_eq!(tpl.style(), PlaceholderStyle::Positional);
    assert_eq!(tpl.placeholder_count(), 2);
}

#[test]
fn postgres_casts_coexist_with_positional_tokens() {
    let tpl = Template::parse("SELECT ?::int, created::date FROM t").unwrap();
    assert_eq!(tpl.style(), PlaceholderStyle::Positional);
    assert_eq!(tpl.placeholder_count(), 1);
}

#[test]
fn errors_surface_through_statement_prepare() {
    let driver = sql_stmt::test_utils::RecordingDriver::new();
    let err = PreparedStatement::prepare(&driver, "SELECT ?, :x", StatementOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        StmtError::Parse(ParseError::MixedPlaceholderStyle { offset: 10 })
    ));
    assert!(driver.calls().is_empty());
}

#[test]
fn translation_preserves_occurrence_numbering() {
    let tpl = Template::parse("SELECT * FROM orders WHERE customer = :cid OR referrer = :cid").unwrap();
    assert_eq!(
        tpl.translate(Dialect::Sqlite),
        "SELECT * FROM orders WHERE customer = ?1 OR referrer = ?2"
    );
}
